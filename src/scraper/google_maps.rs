// google_maps.rs
use crate::domain::{Listing, SourceTag};
use crate::matching::FuzzyMatcher;
use crate::scraper::models::{DetailsResponse, FindPlaceResponse, Place, PlacesPage};
use crate::scraper::{RatingSite, ScraperError, USER_AGENT};
use crate::workers::CancelToken;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const PLACES_API: &str = "https://maps.googleapis.com/maps/api/place";
const PLACE_LINK_PREFIX: &str = "https://www.google.com/maps/place/?q=place_id:";
const PLACE_FIELDS: &str = "rating,user_ratings_total,name,place_id,formatted_address,geometry";

// Text search serves at most three pages.
const EXTRA_PAGES: usize = 2;
const PHOTO_LIMIT: usize = 3;
const PHOTO_MAX_HEIGHT: &str = "1500";

pub struct GoogleMaps {
    client: Client,
    api_key: String,
    page_delay: Duration,
}

impl GoogleMaps {
    /// `page_delay` is waited before every follow-up page: a fresh
    /// `next_page_token` is rejected until it becomes valid server side.
    pub fn new(api_key: String, page_delay: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            page_delay,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ScraperError> {
        let base = format!("{PLACES_API}/{path}");
        Url::parse_with_params(
            &base,
            params
                .iter()
                .copied()
                .chain(std::iter::once(("key", self.api_key.as_str()))),
        )
        .map_err(|e| ScraperError::Config(format!("bad places url: {e}")))
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ScraperError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::Network(format!("Places HTTP {status}")));
        }
        resp.json::<T>()
            .map_err(|e| ScraperError::JsonParse(e.to_string()))
    }

    fn fetch_pages(
        &self,
        town: &str,
        max_count: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<PlacesPage>, ScraperError> {
        let query = format!("restaurants in {town}");
        let url = self.endpoint("textsearch/json", &[("query", query.as_str())])?;
        let first: PlacesPage = self.get_json(url)?;
        check_status(first.status.as_deref(), first.error_message.as_deref())?;

        let mut seen = first.results.len();
        let mut token = first.next_page_token.clone();
        let mut pages = vec![first];

        for page_number in 2..=EXTRA_PAGES + 1 {
            if seen >= max_count {
                break;
            }
            let Some(page_token) = token.take() else {
                break;
            };

            if cancel.is_cancelled() {
                return Err(ScraperError::Cancelled);
            }
            debug!("google_maps: waiting {:?} before page {page_number}", self.page_delay);
            std::thread::sleep(self.page_delay);
            if cancel.is_cancelled() {
                return Err(ScraperError::Cancelled);
            }

            let url = self.endpoint("textsearch/json", &[("pagetoken", page_token.as_str())])?;
            let page: PlacesPage = self.get_json(url)?;
            check_status(page.status.as_deref(), page.error_message.as_deref())?;

            seen += page.results.len();
            token = page.next_page_token.clone();
            pages.push(page);
        }

        Ok(pages)
    }

    /// Query string for the direct lookup fallback.
    pub fn search_string(name: &str, town: &str) -> String {
        if name.to_lowercase().contains("restaurant") {
            format!("{name} {town}")
        } else {
            format!("restaurant {name} {town}")
        }
    }

    fn find_place(&self, query: &str) -> Result<Option<Listing>, ScraperError> {
        let url = self.endpoint(
            "findplacefromtext/json",
            &[
                ("input", query),
                ("inputtype", "textquery"),
                ("fields", PLACE_FIELDS),
            ],
        )?;
        let response: FindPlaceResponse = self.get_json(url)?;
        check_status(response.status.as_deref(), None)?;

        match response.candidates.first() {
            Some(candidate) => parse_place(candidate).map(Some),
            None => Ok(None),
        }
    }

    fn fetch_details(&self, listing: &Listing) -> Result<Listing, ScraperError> {
        let place_id = place_id(&listing.link).ok_or_else(|| {
            ScraperError::UnexpectedShape(format!("no place id in link {}", listing.link))
        })?;
        let url = self.endpoint(
            "details/json",
            &[("place_id", place_id), ("fields", "review,photos")],
        )?;
        let response: DetailsResponse = self.get_json(url)?;
        check_status(response.status.as_deref(), None)?;

        let details = response
            .result
            .ok_or_else(|| ScraperError::UnexpectedShape("details without result".into()))?;

        let reviews: Vec<String> = details
            .reviews
            .into_iter()
            .map(|r| r.text)
            .filter(|text| !text.trim().is_empty())
            .collect();

        let mut photos = Vec::new();
        for photo in details.photos.iter().take(PHOTO_LIMIT) {
            match self.fetch_photo(&photo.photo_reference) {
                Ok(encoded) => photos.push(encoded),
                Err(e) => warn!("google_maps: photo for '{}' skipped: {e}", listing.name),
            }
        }

        let mut completed = listing.clone();
        completed.reviews = Some(reviews);
        completed.photos = Some(photos);
        Ok(completed)
    }

    fn fetch_photo(&self, reference: &str) -> Result<String, ScraperError> {
        let url = self.endpoint(
            "photo",
            &[("maxheight", PHOTO_MAX_HEIGHT), ("photoreference", reference)],
        )?;
        let resp = self.client.get(url).send()?;
        if !resp.status().is_success() {
            return Err(ScraperError::Network(format!("photo HTTP {}", resp.status())));
        }
        let bytes = resp.bytes()?;
        Ok(STANDARD.encode(&bytes))
    }
}

impl RatingSite for GoogleMaps {
    fn source_tag(&self) -> SourceTag {
        SourceTag::GoogleMaps
    }

    fn fetch_listings(
        &self,
        locale: &str,
        max_count: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<Listing>, ScraperError> {
        let pages = self.fetch_pages(locale, max_count, cancel)?;
        let mut listings: Vec<Listing> = pages
            .iter()
            .flat_map(|page| listings_from_values(&page.results))
            .collect();
        listings.truncate(max_count);

        info!("google_maps: {} listings for '{locale}'", listings.len());
        Ok(listings)
    }

    fn find_counterpart(&self, listing: &Listing, pool: &[Listing], locale: &str) -> Option<Listing> {
        if let Some(found) = FuzzyMatcher::default().best_match(listing, pool) {
            return Some(found.listing.clone());
        }

        let query = Self::search_string(&listing.name, locale);
        match self.find_place(&query) {
            Ok(found) => found,
            Err(e) => {
                warn!("google_maps: lookup for '{}' failed: {e}", listing.name);
                None
            }
        }
    }

    fn complete_listing(&self, listing: &Listing) -> Listing {
        if listing.is_completed() {
            return listing.clone();
        }
        match self.fetch_details(listing) {
            Ok(completed) => completed,
            Err(e) => {
                warn!(
                    "google_maps: could not complete '{}', keeping basic info: {e}",
                    listing.name
                );
                listing.clone()
            }
        }
    }
}

fn check_status(status: Option<&str>, message: Option<&str>) -> Result<(), ScraperError> {
    let detail = message.unwrap_or("");
    match status {
        None | Some("OK") | Some("ZERO_RESULTS") => Ok(()),
        Some(s @ ("REQUEST_DENIED" | "OVER_QUERY_LIMIT")) => {
            Err(ScraperError::Blocked(format!("{s} {detail}").trim().to_string()))
        }
        Some(other) => Err(ScraperError::UnexpectedShape(
            format!("status {other} {detail}").trim().to_string(),
        )),
    }
}

/// `place_id` carried in a listing link.
pub fn place_id(link: &str) -> Option<&str> {
    link.rsplit_once("place_id:")
        .map(|(_, id)| id)
        .filter(|id| !id.is_empty())
}

pub fn parse_place(value: &Value) -> Result<Listing, ScraperError> {
    let place: Place = serde_json::from_value(value.clone())
        .map_err(|e| ScraperError::UnexpectedShape(format!("place: {e}")))?;

    let coordinate = place.geometry.and_then(|g| g.location);
    let mut listing = Listing::from_native(
        place.name,
        format!("{PLACE_LINK_PREFIX}{}", place.place_id),
        place.rating,
        place.user_ratings_total,
        SourceTag::GoogleMaps,
    );
    listing.formatted_address = place.formatted_address;
    listing.location_lat = coordinate.as_ref().and_then(|c| c.lat);
    listing.location_lng = coordinate.as_ref().and_then(|c| c.lng);
    Ok(listing)
}

/// Parses every entry, skipping (and logging) the malformed ones.
pub fn listings_from_values(values: &[Value]) -> Vec<Listing> {
    values
        .iter()
        .filter_map(|value| match parse_place(value) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("google_maps: skipping malformed result: {e}");
                None
            }
        })
        .collect()
}
