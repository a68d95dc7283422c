use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// AniList media identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub u64);

impl Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Title variants as returned by AniList
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaTitle {
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub romaji: Option<String>,
}

impl MediaTitle {
    /// Display name, preferring English and falling back to Romaji
    ///
    /// Empty strings count as missing.
    pub fn display_name(&self) -> Option<&str> {
        self.english
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.romaji.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Removes characters that would split a CSV field or row
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ',' | '\n' | '\r'))
        .collect()
}

/// One recommended title as reported by one source title's page
///
/// Two candidates are the same only when id, score and name all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidate {
    pub id: MediaId,
    pub score: u32,
    pub name: String,
}

impl Candidate {
    pub fn new(id: MediaId, score: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            score,
            name: name.into(),
        }
    }
}

/// Why a candidate made it into the final set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Mean score met the threshold
    Score(u32),
    /// Recommended by more than the frequency cutoff of source titles
    Frequency(u32),
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::Score(score) => write!(f, "has a score of {}", score),
            Reason::Frequency(count) => write!(f, "has been recommended {} times.", count),
        }
    }
}

/// An admitted candidate paired with its reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub candidate: Candidate,
    pub reason: Reason,
}
