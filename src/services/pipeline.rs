use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Recommendation, Threshold},
    services::{
        aggregator::RecommendationProfile, classifier::classify, providers::AnimeCatalog,
        report::save_report,
    },
};

/// Runs one recommendation pass for `username` and saves the report
///
/// Nothing is fetched when the catalog is down. Requests are strictly sequential:
/// watch lists first, then one recommendation page per seed title.
pub async fn run(
    catalog: &dyn AnimeCatalog,
    config: &Config,
    username: &str,
    threshold: Threshold,
) -> AppResult<Vec<Recommendation>> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run", run_id = %run_id, username = %username);

    async move {
        let recommendations = collect(catalog, username, threshold).await?;
        save_report(config.output_path(), &recommendations)?;
        Ok(recommendations)
    }
    .instrument(span)
    .await
}

/// Fetches, classifies and aggregates without touching the filesystem
pub async fn collect(
    catalog: &dyn AnimeCatalog,
    username: &str,
    threshold: Threshold,
) -> AppResult<Vec<Recommendation>> {
    if !catalog.service_available().await? {
        tracing::error!("AniList root did not answer with 200");
        return Err(AppError::ServiceUnavailable);
    }

    let lists = catalog.fetch_watch_lists(username).await?;
    let classification = classify(&lists, threshold);
    let mut profile = RecommendationProfile::new(username, threshold, classification);

    let seeds = profile.seeds().to_vec();
    for (index, media_id) in seeds.into_iter().enumerate() {
        let page = catalog.fetch_recommendations(media_id).await?;
        let summary = profile.process_page(&page)?;
        tracing::debug!(
            media_id = %media_id,
            progress = index + 1,
            processed = summary.processed,
            excluded = summary.excluded,
            admitted = summary.admitted_on_score,
            unread = summary.unread,
            "Page folded"
        );
    }

    Ok(profile.finish())
}
