// src/domain/merged.rs

use crate::domain::{Listing, SourceTag};
use serde::{Deserialize, Serialize};

/// Listings from different sources believed to describe the same restaurant.
/// Holds at most one listing per source; the first listing seen for a source wins.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedEntity {
    listings: Vec<Listing>,
}

impl MergedEntity {
    pub fn new(first: Listing) -> Self {
        Self {
            listings: vec![first],
        }
    }

    pub fn from_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let mut merged = Self {
            listings: Vec::new(),
        };
        for listing in listings {
            merged = merged.with_counterpart(listing);
        }
        merged
    }

    /// Returns the entity extended by `listing`, unless its source is already represented.
    pub fn with_counterpart(mut self, listing: Listing) -> Self {
        if self.listing_for(listing.site).is_none() {
            self.listings.push(listing);
        }
        self
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn listing_for(&self, site: SourceTag) -> Option<&Listing> {
        self.listings.iter().find(|l| l.site == site)
    }

    pub fn source_count(&self) -> usize {
        self.listings.len()
    }

    pub fn covers(&self, sites: &[SourceTag]) -> bool {
        sites.iter().all(|site| self.listing_for(*site).is_some())
    }

    /// Display name comes from the primary source, or the first listing when the
    /// primary source is not represented.
    pub fn display_name(&self, primary: SourceTag) -> &str {
        self.listing_for(primary)
            .or_else(|| self.listings.first())
            .map(|l| l.name.as_str())
            .unwrap_or("")
    }

    /// Listings ordered by the given source order.
    pub fn ordered_by(&self, order: &[SourceTag]) -> Vec<Listing> {
        order
            .iter()
            .filter_map(|site| self.listing_for(*site).cloned())
            .collect()
    }
}

/// Final, scored record handed to the API and the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRestaurant {
    pub name: String,
    pub score: f64,
    pub review: Option<String>,
    pub all_sites: Vec<Listing>,
}

impl RankedRestaurant {
    pub fn site(&self, site: SourceTag) -> Option<&Listing> {
        self.all_sites.iter().find(|l| l.site == site)
    }
}
