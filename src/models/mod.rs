use serde::Deserialize;

mod threshold;
mod title;

pub use threshold::Threshold;
pub use title::{sanitize_name, Candidate, MediaId, MediaTitle, Reason, Recommendation};

// ============================================================================
// GraphQL envelope
// ============================================================================

/// Raw response envelope from the AniList GraphQL endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

impl<T> GraphQlResponse<T> {
    /// AniList signals throttling with `data: null` and a 429 as the first error
    pub fn is_rate_limited(&self) -> bool {
        self.data.is_none() && self.errors.first().and_then(|e| e.status) == Some(429)
    }

    /// Human-readable summary of the error list
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "response contained no data".to_string();
        }
        self.errors
            .iter()
            .map(|e| match (e.status, e.message.as_deref()) {
                (Some(status), Some(msg)) => format!("{} ({})", msg, status),
                (Some(status), None) => format!("status {}", status),
                (None, Some(msg)) => msg.to_string(),
                (None, None) => "unknown error".to_string(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ============================================================================
// Watch lists
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WatchListsData {
    pub media_list_collection: MediaListCollection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaListCollection {
    pub lists: Vec<MediaList>,
}

/// Watch list status; custom lists come back without one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    Current,
    Planning,
    Completed,
    Dropped,
    Paused,
    Repeating,
}

impl ListStatus {
    /// Lists whose well-scored entries seed recommendation requests
    pub fn is_seed_source(self) -> bool {
        matches!(self, ListStatus::Completed | ListStatus::Current)
    }
}

/// One of a user's watch lists
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaList {
    #[serde(default)]
    pub status: Option<ListStatus>,
    pub entries: Vec<ListEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    pub media_id: MediaId,
    /// User score on the 0-100 scale
    pub score: f64,
    pub media: ListEntryMedia,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntryMedia {
    #[serde(default)]
    pub mean_score: Option<u32>,
}

// ============================================================================
// Recommendations
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaPageData {
    pub media: MediaPage,
}

/// A title with its first page of recommendations
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaPage {
    pub id: MediaId,
    pub title: MediaTitle,
    pub recommendations: RecommendationConnection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationConnection {
    pub nodes: Vec<RecommendationNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationNode {
    /// Null when the recommended media was removed or hidden
    #[serde(default)]
    pub media_recommendation: Option<RecommendedMedia>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedMedia {
    pub id: MediaId,
    pub title: MediaTitle,
    #[serde(default)]
    pub mean_score: Option<u32>,
}
