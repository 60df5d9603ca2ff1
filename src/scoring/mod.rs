// src/scoring/mod.rs
//
// Desirability score of a listing relative to a cohort of peers:
//
//   popularity = log2(reviews) / log2(max reviews in cohort) * 10, clamped to [0, 10]
//   quality    = (rating - 7) * 10 / 3
//   composite  = quality_weight * quality + popularity_weight * popularity
//
// A merged restaurant scores the mean of its listings' composites, each listing
// judged against the cohort of its own source.

use crate::domain::{Listing, MergedEntity, SourceTag};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

const MAX_COMPONENT: f64 = 10.0;
const QUALITY_BASELINE: f64 = 7.0;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("cannot score against an empty cohort")]
    EmptyCohort,
    #[error("no cohort for source {0}")]
    MissingCohort(SourceTag),
}

/// How the weighted blend is compressed before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Damping {
    #[default]
    None,
    /// Sign preserving square root: `signum(x) * sqrt(|x|)`.
    Sqrt,
}

impl FromStr for Damping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Damping::None),
            "sqrt" => Ok(Damping::Sqrt),
            other => Err(format!("unknown damping '{other}' (expected none|sqrt)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub quality: f64,
    pub popularity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            quality: 0.6,
            popularity: 0.4,
        }
    }
}

/// Comparison context for scoring: what the peers look like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cohort {
    max_reviews: u64,
}

impl Cohort {
    pub fn from_counts(counts: impl IntoIterator<Item = u64>) -> Result<Self, ScoreError> {
        let mut counts = counts.into_iter().peekable();
        if counts.peek().is_none() {
            return Err(ScoreError::EmptyCohort);
        }
        Ok(Self {
            max_reviews: counts.max().unwrap_or(0),
        })
    }

    pub fn of<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Result<Self, ScoreError> {
        Self::from_counts(listings.into_iter().map(|l| l.number_of_reviews))
    }

    pub fn max_reviews(&self) -> u64 {
        self.max_reviews
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCalculator {
    weights: ScoreWeights,
    damping: Damping,
}

impl ScoreCalculator {
    pub fn new(weights: ScoreWeights, damping: Damping) -> Self {
        Self { weights, damping }
    }

    /// Logarithmic popularity in [0, 10]. Counts of 0 or 1 carry no signal.
    pub fn popularity(number_of_reviews: u64, cohort: &Cohort) -> f64 {
        if number_of_reviews <= 1 || cohort.max_reviews <= 1 {
            return 0.0;
        }
        let ratio = (number_of_reviews as f64).log2() / (cohort.max_reviews as f64).log2();
        (ratio * MAX_COMPONENT).clamp(0.0, MAX_COMPONENT)
    }

    /// Linear quality: 7 maps to 0, 10 maps to 10, below 7 goes negative.
    pub fn quality(rating: f64) -> f64 {
        (rating - QUALITY_BASELINE) * MAX_COMPONENT / 3.0
    }

    pub fn score(&self, listing: &Listing, cohort: &Cohort) -> f64 {
        let blend = self.weights.quality * Self::quality(listing.rating)
            + self.weights.popularity * Self::popularity(listing.number_of_reviews, cohort);
        match self.damping {
            Damping::None => blend,
            Damping::Sqrt => blend.signum() * blend.abs().sqrt(),
        }
    }

    pub fn score_against(&self, listing: &Listing, peers: &[Listing]) -> Result<f64, ScoreError> {
        let cohort = Cohort::of(peers)?;
        Ok(self.score(listing, &cohort))
    }

    /// Listings of one pool, best first. The pool is its own cohort.
    /// Equal scores keep their input order.
    pub fn rank<'a>(&self, pool: &'a [Listing]) -> Result<Vec<(&'a Listing, f64)>, ScoreError> {
        let cohort = Cohort::of(pool)?;
        let mut ranked: Vec<(&Listing, f64)> =
            pool.iter().map(|l| (l, self.score(l, &cohort))).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }

    /// One cohort per source, built from every listing of the given entities.
    pub fn cohorts_by_source(
        entities: &[MergedEntity],
    ) -> Result<HashMap<SourceTag, Cohort>, ScoreError> {
        if entities.is_empty() {
            return Err(ScoreError::EmptyCohort);
        }
        let mut counts: HashMap<SourceTag, Vec<u64>> = HashMap::new();
        for listing in entities.iter().flat_map(|e| e.listings()) {
            counts
                .entry(listing.site)
                .or_default()
                .push(listing.number_of_reviews);
        }
        counts
            .into_iter()
            .map(|(site, counts)| Cohort::from_counts(counts).map(|c| (site, c)))
            .collect()
    }

    /// Mean of the per-listing scores, each against its own source's cohort.
    pub fn merged_score(
        &self,
        entity: &MergedEntity,
        cohorts: &HashMap<SourceTag, Cohort>,
    ) -> Result<f64, ScoreError> {
        let listings = entity.listings();
        if listings.is_empty() {
            return Err(ScoreError::EmptyCohort);
        }
        let mut total = 0.0;
        for listing in listings {
            let cohort = cohorts
                .get(&listing.site)
                .ok_or(ScoreError::MissingCohort(listing.site))?;
            total += self.score(listing, cohort);
        }
        Ok(total / listings.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(rating: f64, reviews: u64) -> Listing {
        Listing::new("x", format!("x:{rating}:{reviews}"), rating, reviews, SourceTag::GoogleMaps)
    }

    #[test]
    fn empty_cohort_is_an_error() {
        let calc = ScoreCalculator::default();
        assert_eq!(
            calc.score_against(&listing(9.0, 10), &[]),
            Err(ScoreError::EmptyCohort)
        );
        assert_eq!(calc.rank(&[]).unwrap_err(), ScoreError::EmptyCohort);
        assert_eq!(
            ScoreCalculator::cohorts_by_source(&[]).unwrap_err(),
            ScoreError::EmptyCohort
        );
    }

    #[test]
    fn popularity_stays_within_bounds() {
        let cohort = Cohort::from_counts([0, 1, 2, 50, 4000]).unwrap();
        for count in [0, 1, 2, 3, 50, 999, 4000, 1_000_000] {
            let p = ScoreCalculator::popularity(count, &cohort);
            assert!((0.0..=10.0).contains(&p), "popularity {p} for {count}");
        }
        assert_eq!(ScoreCalculator::popularity(4000, &cohort), 10.0);
    }

    #[test]
    fn degenerate_counts_give_zero_popularity() {
        let tiny = Cohort::from_counts([1, 1]).unwrap();
        assert_eq!(ScoreCalculator::popularity(1, &tiny), 0.0);
        let cohort = Cohort::from_counts([1024]).unwrap();
        assert_eq!(ScoreCalculator::popularity(0, &cohort), 0.0);
        assert_eq!(ScoreCalculator::popularity(1, &cohort), 0.0);
        assert!((ScoreCalculator::popularity(32, &cohort) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn quality_is_anchored_at_seven_and_ten() {
        assert_eq!(ScoreCalculator::quality(7.0), 0.0);
        assert!((ScoreCalculator::quality(10.0) - 10.0).abs() < 1e-9);
        assert!(ScoreCalculator::quality(5.0) < 0.0);
    }

    #[test]
    fn composite_uses_reference_weights() {
        let cohort = Cohort::from_counts([1024]).unwrap();
        let score = ScoreCalculator::default().score(&listing(10.0, 1024), &cohort);
        assert!((score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn score_is_monotonic_in_rating_and_reviews() {
        let pool: Vec<Listing> = (0..=20)
            .flat_map(|r| [0, 1, 2, 10, 100, 5000].map(move |n| listing(r as f64 / 2.0, n)))
            .collect();
        for damping in [Damping::None, Damping::Sqrt] {
            let calc = ScoreCalculator::new(ScoreWeights::default(), damping);
            let cohort = Cohort::of(&pool).unwrap();
            for a in &pool {
                for b in &pool {
                    if a.number_of_reviews == b.number_of_reviews && a.rating > b.rating {
                        assert!(calc.score(a, &cohort) >= calc.score(b, &cohort));
                    }
                    if a.rating == b.rating && a.number_of_reviews > b.number_of_reviews {
                        assert!(calc.score(a, &cohort) >= calc.score(b, &cohort));
                    }
                }
            }
        }
    }

    #[test]
    fn rank_orders_best_first_and_keeps_ties_stable() {
        let pool = vec![listing(8.0, 10), listing(9.0, 10), listing(8.0, 10)];
        let ranked = ScoreCalculator::default().rank(&pool).unwrap();
        assert_eq!(ranked[0].0.rating, 9.0);
        assert!(std::ptr::eq(ranked[1].0, &pool[0]));
        assert!(std::ptr::eq(ranked[2].0, &pool[2]));
    }

    #[test]
    fn merged_score_is_mean_of_per_source_scores() {
        let gm = Listing::new("A", "gm:a", 10.0, 100, SourceTag::GoogleMaps);
        let ta = Listing::new("A", "ta:a", 7.0, 100, SourceTag::TripAdvisor);
        let entity = MergedEntity::new(gm).with_counterpart(ta);
        let entities = vec![entity.clone()];
        let cohorts = ScoreCalculator::cohorts_by_source(&entities).unwrap();
        let calc = ScoreCalculator::default();

        // gm: 0.6 * 10 + 0.4 * 10 = 10; ta: 0.6 * 0 + 0.4 * 10 = 4
        let score = calc.merged_score(&entity, &cohorts).unwrap();
        assert!((score - 7.0).abs() < 1e-9);
    }

    #[test]
    fn merged_score_without_cohort_for_source_fails() {
        let entity = MergedEntity::new(listing(9.0, 10));
        let cohorts = HashMap::new();
        assert_eq!(
            ScoreCalculator::default().merged_score(&entity, &cohorts),
            Err(ScoreError::MissingCohort(SourceTag::GoogleMaps))
        );
    }

    #[test]
    fn damping_parses_from_config_strings() {
        assert_eq!("sqrt".parse::<Damping>().unwrap(), Damping::Sqrt);
        assert_eq!(" None ".parse::<Damping>().unwrap(), Damping::None);
        assert!("log".parse::<Damping>().is_err());
    }
}
