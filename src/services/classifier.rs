use std::collections::HashSet;

use crate::models::{MediaId, MediaList, Threshold};

/// Titles to ask recommendations for, and titles never to recommend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Well-scored completed/current titles, in first-seen order without repeats
    pub seeds: Vec<MediaId>,
    /// Every title on any of the user's lists
    pub exclusions: HashSet<MediaId>,
}

/// Splits a user's watch lists into seed titles and exclusions
///
/// A seed is usually excluded as well; exclusion only applies to the recommended
/// titles, so an excluded title still acts as a recommendation source.
pub fn classify(lists: &[MediaList], threshold: Threshold) -> Classification {
    let mut classification = Classification::default();
    let mut seen_seeds = HashSet::new();

    for list in lists {
        let seeds_from_list = list.status.is_some_and(|s| s.is_seed_source());

        for entry in &list.entries {
            if seeds_from_list
                && threshold.admits_user_score(entry.score)
                && seen_seeds.insert(entry.media_id)
            {
                classification.seeds.push(entry.media_id);
            }
            classification.exclusions.insert(entry.media_id);
        }
    }

    tracing::info!(
        seeds = classification.seeds.len(),
        exclusions = classification.exclusions.len(),
        threshold = %threshold,
        "Watch lists classified"
    );

    classification
}
