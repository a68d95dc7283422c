use std::collections::{HashMap, HashSet};

use crate::{
    error::{AppError, AppResult},
    models::{sanitize_name, Candidate, MediaId, MediaPage, Reason, Recommendation, Threshold},
    services::classifier::Classification,
};

/// A candidate needs strictly more sightings than this to be admitted on frequency
pub const FREQUENCY_CUTOFF: u32 = 4;

/// Cumulative recommendation state for one run
///
/// Built from the classified watch lists, fed one recommendation page per seed
/// title, then consumed by [`RecommendationProfile::finish`].
#[derive(Debug, Clone)]
pub struct RecommendationProfile {
    username: String,
    threshold: Threshold,
    seeds: Vec<MediaId>,
    exclusions: HashSet<MediaId>,
    /// Sightings per exact candidate, across seed pages
    ledger: HashMap<Candidate, u32>,
    /// First reason assigned to each title id
    reasons: HashMap<MediaId, Reason>,
    admitted: HashSet<Candidate>,
}

/// What folding one page did, for logging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub processed: usize,
    pub excluded: usize,
    pub admitted_on_score: usize,
    /// Entries left unread because a null recommendation ended the page
    pub unread: usize,
}

impl RecommendationProfile {
    pub fn new(username: impl Into<String>, threshold: Threshold, classification: Classification) -> Self {
        Self {
            username: username.into(),
            threshold,
            seeds: classification.seeds,
            exclusions: classification.exclusions,
            ledger: HashMap::new(),
            reasons: HashMap::new(),
            admitted: HashSet::new(),
        }
    }

    /// Titles to request recommendations for, in request order
    pub fn seeds(&self) -> &[MediaId] {
        &self.seeds
    }

    pub fn is_excluded(&self, id: MediaId) -> bool {
        self.exclusions.contains(&id)
    }

    /// How many seed pages surfaced exactly this candidate so far
    pub fn times_recommended(&self, candidate: &Candidate) -> u32 {
        self.ledger.get(candidate).copied().unwrap_or(0)
    }

    pub fn reason_for(&self, id: MediaId) -> Option<Reason> {
        self.reasons.get(&id).copied()
    }

    pub fn is_admitted(&self, candidate: &Candidate) -> bool {
        self.admitted.contains(candidate)
    }

    /// Folds one seed title's recommendation page into the profile
    ///
    /// Reading stops at the first node without a recommended media; the nodes after
    /// it are counted as unread but never looked at.
    pub fn process_page(&mut self, page: &MediaPage) -> AppResult<PageSummary> {
        let source_name = page.title.display_name().unwrap_or("<untitled>");
        tracing::info!(media_id = %page.id, title = %source_name, "Getting recommendations");

        let mut summary = PageSummary::default();
        let nodes = &page.recommendations.nodes;

        for (index, node) in nodes.iter().enumerate() {
            let Some(media) = &node.media_recommendation else {
                summary.unread = nodes.len() - index - 1;
                if summary.unread > 0 {
                    tracing::debug!(
                        media_id = %page.id,
                        unread = summary.unread,
                        "Null recommendation ended the page early"
                    );
                }
                break;
            };

            summary.processed += 1;

            if self.is_excluded(media.id) {
                tracing::info!(
                    media_id = %media.id,
                    title = media.title.display_name().unwrap_or("<untitled>"),
                    "Already in a watch list, skipping"
                );
                summary.excluded += 1;
                continue;
            }

            let name = media.title.display_name().ok_or_else(|| {
                AppError::ExternalApi(format!("Recommended media {} has no title", media.id))
            })?;
            let candidate = Candidate::new(
                media.id,
                media.mean_score.unwrap_or(0),
                sanitize_name(name),
            );

            if self.threshold.admits(candidate.score) {
                tracing::info!(title = %candidate.name, score = candidate.score, "Has a qualifying score");
                self.admit(candidate.clone(), Reason::Score(candidate.score));
                summary.admitted_on_score += 1;
            }

            *self.ledger.entry(candidate).or_insert(0) += 1;
        }

        Ok(summary)
    }

    /// Runs the frequency pass and returns every admitted candidate with its reason
    pub fn finish(mut self) -> Vec<Recommendation> {
        let mut frequent: Vec<(Candidate, u32)> = self
            .ledger
            .iter()
            .filter(|(candidate, count)| **count > FREQUENCY_CUTOFF && !self.admitted.contains(*candidate))
            .map(|(candidate, count)| (candidate.clone(), *count))
            .collect();
        frequent.sort();

        for (candidate, count) in frequent {
            tracing::info!(title = %candidate.name, times = count, "Recommended often enough");
            self.admit(candidate, Reason::Frequency(count));
        }

        let mut recommendations: Vec<Recommendation> = self
            .admitted
            .into_iter()
            .filter_map(|candidate| {
                self.reasons
                    .get(&candidate.id)
                    .copied()
                    .map(|reason| Recommendation { candidate, reason })
            })
            .collect();
        recommendations.sort_by(|a, b| a.candidate.cmp(&b.candidate));

        tracing::info!(
            username = %self.username,
            recommendations = recommendations.len(),
            "Recommendations finalized"
        );

        recommendations
    }

    /// Adds to the final set; the first reason recorded for an id is kept
    fn admit(&mut self, candidate: Candidate, reason: Reason) {
        self.reasons.entry(candidate.id).or_insert(reason);
        self.admitted.insert(candidate);
    }
}
