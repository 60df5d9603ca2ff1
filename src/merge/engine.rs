// src/merge/engine.rs

use crate::domain::{Listing, MergedEntity, RankedRestaurant, SourceTag};
use crate::merge::AggregateError;
use crate::review::{choose_review, ReviewPolicy};
use crate::scoring::ScoreCalculator;
use crate::scraper::RatingSite;
use crate::workers::{map_bounded, CancelToken};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

/// How many sources must be represented for a merged restaurant to survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredSources {
    All,
    AtLeast(usize),
}

impl FromStr for RequiredSources {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(RequiredSources::All);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(RequiredSources::AtLeast(n)),
            _ => Err(format!("invalid required sources '{s}' (expected 'all' or a positive number)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeSettings {
    /// Listings requested from each source.
    pub fetch_count: usize,
    /// Best listings per source that go through cross-source matching.
    pub top_k: usize,
    /// Default size of the final ranking.
    pub result_limit: usize,
    pub required: RequiredSources,
    pub review_policy: ReviewPolicy,
    /// Run each provider's detail completion on the final ranking.
    pub complete_details: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            fetch_count: 200,
            top_k: 60,
            result_limit: 10,
            required: RequiredSources::All,
            review_policy: ReviewPolicy::default(),
            complete_details: true,
        }
    }
}

pub struct MergeEngine {
    sites: Vec<Arc<dyn RatingSite>>,
    scorer: ScoreCalculator,
    settings: MergeSettings,
}

impl MergeEngine {
    /// `sites` order is significant: the first site is the primary source and
    /// every tie-break follows this order.
    pub fn new(sites: Vec<Arc<dyn RatingSite>>, scorer: ScoreCalculator, settings: MergeSettings) -> Self {
        Self {
            sites,
            scorer,
            settings,
        }
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    pub fn source_order(&self) -> Vec<SourceTag> {
        self.sites.iter().map(|s| s.source_tag()).collect()
    }

    fn primary(&self) -> SourceTag {
        self.sites
            .first()
            .map(|s| s.source_tag())
            .unwrap_or(SourceTag::GoogleMaps)
    }

    fn site_for(&self, tag: SourceTag) -> Option<&Arc<dyn RatingSite>> {
        self.sites.iter().find(|s| s.source_tag() == tag)
    }

    /// Full run for one locale: fetch, pair, filter, deduplicate, rank.
    ///
    /// `cancel` is checked between provider requests, pairings and detail
    /// completions; a cancelled run returns `AggregateError::Cancelled`.
    pub fn aggregate(
        &self,
        locale: &str,
        limit: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<Vec<RankedRestaurant>, AggregateError> {
        info!("Aggregating restaurants for '{locale}'");

        let pools = self.fetch_pools(locale, cancel)?;
        let merged = self.merge_pools(&pools, locale, cancel)?;
        let ranked = self.rank(merged, limit.unwrap_or(self.settings.result_limit))?;

        info!("Ranked {} restaurants for '{locale}'", ranked.len());
        let mut results = Vec::with_capacity(ranked.len());
        for (entity, score) in ranked {
            check(cancel)?;
            results.push(self.finalize(entity, score));
        }
        Ok(results)
    }

    /// One fetch per source, concurrently. Pools come back in source order.
    /// Any source failing fails the whole locale.
    pub fn fetch_pools(
        &self,
        locale: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Vec<Listing>>, AggregateError> {
        let fetched = map_bounded(&self.sites, self.sites.len(), |site| {
            site.fetch_listings(locale, self.settings.fetch_count, cancel)
        })?;
        check(cancel)?;

        fetched
            .into_iter()
            .zip(&self.sites)
            .map(|(result, site)| {
                let tag = site.source_tag();
                result
                    .map(|pool| {
                        debug!("{tag}: {} listings for '{locale}'", pool.len());
                        pool
                    })
                    .map_err(|error| AggregateError::Fetch {
                        source_tag: tag,
                        error,
                    })
            })
            .collect()
    }

    /// Pair the top listings of every pool with their counterparts, drop
    /// incomplete pairs and duplicates. `pools` must be in source order.
    pub fn merge_pools(
        &self,
        pools: &[Vec<Listing>],
        locale: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<MergedEntity>, AggregateError> {
        let mut candidates = Vec::new();

        for (origin, pool) in pools.iter().enumerate() {
            if pool.is_empty() {
                warn!("No listings from source #{origin} for '{locale}'");
                continue;
            }
            let ranked = self.scorer.rank(pool)?;
            for (listing, _) in ranked.into_iter().take(self.settings.top_k) {
                check(cancel)?;
                candidates.push(self.pair(origin, listing, pools, locale));
            }
        }

        let before = candidates.len();
        let complete: Vec<MergedEntity> = candidates
            .into_iter()
            .filter(|entity| self.is_complete(entity))
            .collect();
        debug!(
            "{} of {before} candidates for '{locale}' are complete",
            complete.len()
        );

        Ok(self.deduplicate(complete))
    }

    fn pair(&self, origin: usize, listing: &Listing, pools: &[Vec<Listing>], locale: &str) -> MergedEntity {
        let mut entity = MergedEntity::new(listing.clone());

        for (index, site) in self.sites.iter().enumerate() {
            if index == origin || site.source_tag() == listing.site {
                continue;
            }
            let Some(pool) = pools.get(index) else {
                continue;
            };
            match site.find_counterpart(listing, pool, locale) {
                Some(counterpart) => entity = entity.with_counterpart(counterpart),
                None => debug!("No {} counterpart for '{}'", site.source_tag(), listing.name),
            }
        }

        entity
    }

    fn is_complete(&self, entity: &MergedEntity) -> bool {
        match self.settings.required {
            RequiredSources::All => entity.covers(&self.source_order()),
            RequiredSources::AtLeast(n) => entity.source_count() >= n,
        }
    }

    /// Keeps the first entity per primary display name.
    fn deduplicate(&self, entities: Vec<MergedEntity>) -> Vec<MergedEntity> {
        let primary = self.primary();
        let mut seen = HashSet::new();
        entities
            .into_iter()
            .filter(|entity| seen.insert(entity.display_name(primary).to_string()))
            .collect()
    }

    /// Scores every entity against the whole set, best first, truncated to `limit`.
    pub fn rank(
        &self,
        entities: Vec<MergedEntity>,
        limit: usize,
    ) -> Result<Vec<(MergedEntity, f64)>, AggregateError> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let cohorts = ScoreCalculator::cohorts_by_source(&entities)?;
        let mut scored = Vec::with_capacity(entities.len());
        for entity in entities {
            let score = self.scorer.merged_score(&entity, &cohorts)?;
            scored.push((entity, score));
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        Ok(scored)
    }

    fn finalize(&self, entity: MergedEntity, score: f64) -> RankedRestaurant {
        let name = entity.display_name(self.primary()).to_string();
        let mut listings = entity.ordered_by(&self.source_order());

        if self.settings.complete_details {
            listings = listings
                .iter()
                .map(|listing| match self.site_for(listing.site) {
                    Some(site) => site.complete_listing(listing),
                    None => listing.clone(),
                })
                .collect();
        }

        let reviews: Vec<&String> = listings
            .iter()
            .filter_map(|l| l.reviews.as_ref())
            .flatten()
            .collect();

        let review = if reviews.is_empty() {
            None
        } else {
            match choose_review(&reviews, self.settings.review_policy) {
                Ok(review) => Some(review.to_string()),
                Err(e) => {
                    warn!("No representative review for '{name}': {e}");
                    None
                }
            }
        };

        RankedRestaurant {
            name,
            score,
            review,
            all_sites: listings,
        }
    }
}

fn check(cancel: &CancelToken) -> Result<(), AggregateError> {
    if cancel.is_cancelled() {
        return Err(AggregateError::Cancelled);
    }
    Ok(())
}
