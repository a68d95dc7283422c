/// Anime catalog abstraction
///
/// The pipeline and the interactive prompts only talk to the catalog through this
/// trait, so a run can be driven by the live AniList client or by a test double.
use crate::{
    error::AppResult,
    models::{MediaId, MediaList, MediaPage},
};

pub mod anilist;
mod queries;

pub use anilist::AniListClient;

/// Trait for anime catalog backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AnimeCatalog: Send + Sync {
    /// Whether the catalog's site root answers with 200
    async fn service_available(&self) -> AppResult<bool>;

    /// Whether a public profile page exists for `username`
    async fn user_exists(&self, username: &str) -> AppResult<bool>;

    /// Fetch every watch list of a user, grouped by status
    ///
    /// A throttled response is returned as `AppError::RateLimited` without retrying.
    async fn fetch_watch_lists(&self, username: &str) -> AppResult<Vec<MediaList>>;

    /// Fetch a title with its top recommendations, best rated first
    ///
    /// Implementations pace their calls and retry a bounded number of times when
    /// throttled.
    async fn fetch_recommendations(&self, media_id: MediaId) -> AppResult<MediaPage>;
}
