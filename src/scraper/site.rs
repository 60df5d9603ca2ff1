// src/scraper/site.rs

use crate::domain::{Listing, SourceTag};
use crate::matching::FuzzyMatcher;
use crate::scraper::ScraperError;
use crate::workers::CancelToken;

/// A rating provider the merge engine can pull listings from.
///
/// Implementations are shared across worker threads.
pub trait RatingSite: Send + Sync {
    fn source_tag(&self) -> SourceTag;

    /// Up to `max_count` listings for a locale, in the provider's order.
    /// Multi-request providers stop with `ScraperError::Cancelled` once
    /// `cancel` is set.
    fn fetch_listings(
        &self,
        locale: &str,
        max_count: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<Listing>, ScraperError>;

    /// This provider's counterpart of `listing`, looked up in `pool` (this
    /// provider's listings for `locale`). `None` when nothing matches.
    fn find_counterpart(&self, listing: &Listing, pool: &[Listing], locale: &str) -> Option<Listing> {
        let _ = locale;
        FuzzyMatcher::default()
            .best_match(listing, pool)
            .map(|m| m.listing.clone())
    }

    /// Fill reviews, photos and other detail fields. Providers without a
    /// detail endpoint return the listing unchanged.
    fn complete_listing(&self, listing: &Listing) -> Listing {
        listing.clone()
    }
}
