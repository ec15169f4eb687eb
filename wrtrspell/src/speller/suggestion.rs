//! Suggestion for a spelling correction.
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::cmp::Ordering;

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Suggestion for a spelling correction
pub struct Suggestion {
    /// the suggested word-form
    pub value: SmolStr,
    /// edit distance between the input and the word-form
    pub distance: u8,
    /// frequency count of the word-form in the dictionary
    pub frequency: u64,
}

impl Suggestion {
    /// creates a spelling correction suggestion
    pub fn new(value: SmolStr, distance: u8, frequency: u64) -> Suggestion {
        Suggestion {
            value,
            distance,
            frequency,
        }
    }

    /// gets the suggested word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the edit distance of the suggestion
    pub fn distance(&self) -> u8 {
        self.distance
    }

    /// gets the dictionary frequency of the suggestion
    pub fn frequency(&self) -> u64 {
        self.frequency
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Closest first, then most frequent, then alphabetical so ties are stable.
impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.frequency.cmp(&self.frequency))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Suggestion {}
