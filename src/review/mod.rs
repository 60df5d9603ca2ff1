// src/review/mod.rs

pub mod sentiment;

use std::str::FromStr;
use thiserror::Error;

/// Reviews strictly inside this length band (in characters) are considered
/// substantive by the neutral policy.
pub const MIN_REVIEW_CHARS: usize = 250;
pub const MAX_REVIEW_CHARS: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("no reviews to choose from")]
    NoReviews,
    #[error("no review between {min} and {max} characters")]
    NoEligibleReviews { min: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPolicy {
    /// The longest review; the first one on equal length.
    Longest,
    /// Among reviews strictly between `min` and `max` characters, the one with
    /// the lowest absolute polarity; the first one on equal polarity.
    Neutral { min: usize, max: usize },
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        ReviewPolicy::Neutral {
            min: MIN_REVIEW_CHARS,
            max: MAX_REVIEW_CHARS,
        }
    }
}

impl FromStr for ReviewPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "longest" => Ok(ReviewPolicy::Longest),
            "neutral" => Ok(ReviewPolicy::default()),
            other => Err(format!("unknown review policy '{other}' (expected longest|neutral)")),
        }
    }
}

/// Pick one representative review.
pub fn choose_review<S: AsRef<str>>(reviews: &[S], policy: ReviewPolicy) -> Result<&str, ReviewError> {
    if reviews.is_empty() {
        return Err(ReviewError::NoReviews);
    }

    match policy {
        ReviewPolicy::Longest => {
            let mut best = reviews[0].as_ref();
            for review in &reviews[1..] {
                if review.as_ref().chars().count() > best.chars().count() {
                    best = review.as_ref();
                }
            }
            Ok(best)
        }
        ReviewPolicy::Neutral { min, max } => reviews
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| {
                let len = r.chars().count();
                len > min && len < max
            })
            .map(|r| (r, sentiment::polarity(r).abs()))
            .fold(None, |best: Option<(&str, f64)>, candidate| match best {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            })
            .map(|(review, _)| review)
            .ok_or(ReviewError::NoEligibleReviews { min, max }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(base: &str, len: usize) -> String {
        let mut text = base.to_string();
        while text.chars().count() < len {
            text.push_str(" and");
        }
        text.chars().take(len).collect()
    }

    #[test]
    fn longest_policy_picks_longest() {
        let reviews = vec!["short".to_string(), "a bit longer".into(), "mid size".into()];
        assert_eq!(choose_review(&reviews, ReviewPolicy::Longest).unwrap(), "a bit longer");
    }

    #[test]
    fn longest_policy_keeps_first_on_tie() {
        let reviews = ["abc", "xyz"];
        assert_eq!(choose_review(&reviews, ReviewPolicy::Longest).unwrap(), "abc");
    }

    #[test]
    fn neutral_policy_filters_by_length_then_polarity() {
        let reviews = vec![
            padded("Perfect!", 100),
            padded("Delicious, wonderful, excellent food", 300),
            padded("We had the fish and the soup", 600),
            padded("Neutral but far too long", 1200),
        ];
        let chosen = choose_review(&reviews, ReviewPolicy::default()).unwrap();
        assert_eq!(chosen, reviews[2]);
    }

    #[test]
    fn neutral_policy_fails_when_nothing_is_eligible() {
        let reviews: Vec<String> = (0..4).map(|_| padded("ok", 50)).collect();
        assert_eq!(
            choose_review(&reviews, ReviewPolicy::default()),
            Err(ReviewError::NoEligibleReviews {
                min: MIN_REVIEW_CHARS,
                max: MAX_REVIEW_CHARS
            })
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        let reviews: Vec<String> = Vec::new();
        assert_eq!(
            choose_review(&reviews, ReviewPolicy::Longest),
            Err(ReviewError::NoReviews)
        );
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("longest".parse::<ReviewPolicy>().unwrap(), ReviewPolicy::Longest);
        assert_eq!("neutral".parse::<ReviewPolicy>().unwrap(), ReviewPolicy::default());
        assert!("random".parse::<ReviewPolicy>().is_err());
    }
}
