// src/matching/fuzzy.rs

use crate::domain::Listing;
use crate::matching::normalize_name;
use strsim::normalized_levenshtein;

/// Minimum similarity (0..=1) for two names to count as the same place.
pub const MATCH_THRESHOLD: f64 = 0.75;

/// A candidate that cleared the threshold, with its similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatch<'a> {
    pub listing: &'a Listing,
    pub similarity: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            threshold: MATCH_THRESHOLD,
        }
    }
}

impl FuzzyMatcher {
    /// Similarity of two display names after normalization. 1.0 means identical.
    pub fn similarity(a: &str, b: &str) -> f64 {
        normalized_levenshtein(&normalize_name(a), &normalize_name(b))
    }

    /// Closest candidate at or above the threshold.
    ///
    /// Candidates from the target's own source are ignored. On equal similarity
    /// the earliest candidate in `pool` wins.
    pub fn best_match<'a>(&self, target: &Listing, pool: &'a [Listing]) -> Option<NameMatch<'a>> {
        let name = normalize_name(&target.name);
        let mut best: Option<NameMatch<'a>> = None;

        for candidate in pool.iter().filter(|c| c.site != target.site) {
            let similarity = normalized_levenshtein(&name, &normalize_name(&candidate.name));
            if similarity < self.threshold {
                continue;
            }
            let better = match best {
                Some(current) => similarity > current.similarity,
                None => true,
            };
            if better {
                best = Some(NameMatch {
                    listing: candidate,
                    similarity,
                });
            }
        }

        best
    }
}
