use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Score cutoff on AniList's 0-100 scale
///
/// Used both to pick which of the user's titles to ask about and to admit
/// recommended titles on their mean score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Threshold(u32);

impl Threshold {
    pub const MAX: u32 = 100;

    pub fn new(value: u32) -> Result<Self, AppError> {
        if value > Self::MAX {
            return Err(AppError::InvalidInput("above 100".to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Whether a recommended title's mean score clears the cutoff
    pub fn admits(self, score: u32) -> bool {
        score >= self.0
    }

    /// Whether one of the user's own scores clears the cutoff
    pub fn admits_user_score(self, score: f64) -> bool {
        score >= f64::from(self.0)
    }
}

impl TryFrom<i64> for Threshold {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(AppError::InvalidInput("below 0".to_string()));
        }
        let value = u32::try_from(value)
            .map_err(|_| AppError::InvalidInput("above 100".to_string()))?;
        Self::new(value)
    }
}

impl From<Threshold> for u32 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

impl FromStr for Threshold {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidInput("not a numeric value.".to_string()))?;
        Self::try_from(value)
    }
}

impl Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
