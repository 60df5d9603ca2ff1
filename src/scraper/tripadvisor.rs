// tripadvisor.rs
use crate::domain::{Listing, SourceTag};
use crate::scraper::models::{RestaurantEntry, RestaurantList, SearchResponse};
use crate::scraper::{RatingSite, ScraperError, USER_AGENT};
use crate::workers::{map_bounded, CancelToken};
use log::{debug, info, warn};
use rand::Rng;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER};
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

const SEARCH_API: &str = "https://www.googleapis.com/customsearch/v1";
const SITE_ROOT: &str = "https://www.tripadvisor.com";
const TOWN_PAGE_TITLE: &str = "best restaurants in";
const DATA_MARKER: &str = "userReviewCount";
const LIST_START: &str = "{\"restaurants\"";
pub const PAGE_SIZE: usize = 30;

pub struct TripAdvisor {
    client: Client,
    api_key: String,
    search_engine_id: String,
    page_workers: usize,
}

impl TripAdvisor {
    pub fn new(
        api_key: String,
        search_engine_id: String,
        page_workers: usize,
    ) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            search_engine_id,
            page_workers,
        })
    }

    /// Finds the town's restaurant list page through the search API.
    fn locate_town_page(&self, town: &str) -> Result<String, ScraperError> {
        let query = format!("{town} restaurants");
        let url = Url::parse_with_params(
            SEARCH_API,
            &[
                ("key", self.api_key.as_str()),
                ("cx", self.search_engine_id.as_str()),
                ("q", query.as_str()),
            ],
        )
        .map_err(|e| ScraperError::Config(format!("bad search url: {e}")))?;

        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if status.as_u16() == 403 || status.as_u16() == 429 {
            return Err(ScraperError::Blocked(format!("search HTTP {status}")));
        }
        if !status.is_success() {
            return Err(ScraperError::Network(format!("search HTTP {status}")));
        }
        let results: SearchResponse = resp
            .json()
            .map_err(|e| ScraperError::JsonParse(e.to_string()))?;

        town_page_link(&results).ok_or_else(|| {
            ScraperError::UnexpectedShape(format!("no restaurant list page found for '{town}'"))
        })
    }

    fn fetch_html(&self, url: &str, cancel: &CancelToken) -> Result<String, ScraperError> {
        const MAX_ATTEMPTS: u64 = 3;
        const MAX_BACKOFF_SECS: u64 = 6;
        const JITTER_MAX_SECS: u64 = 2;

        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            if cancel.is_cancelled() {
                return Err(ScraperError::Cancelled);
            }
            match self.try_fetch_html(url) {
                Ok(html) => {
                    debug!("tripadvisor: fetched {url} on attempt {attempt}");
                    return Ok(html);
                }
                Err(e) => {
                    warn!("tripadvisor: attempt {attempt} for {url} failed: {e}");
                    last_err = Some(e);

                    if attempt < MAX_ATTEMPTS {
                        let base = std::cmp::min(2 * attempt, MAX_BACKOFF_SECS);
                        let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_SECS);
                        std::thread::sleep(Duration::from_secs(base + jitter));
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ScraperError::Network("retry loop failed".into())))
    }

    fn try_fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if status.as_u16() == 403 || status.as_u16() == 429 {
            return Err(ScraperError::Blocked(format!("HTTP {status} for {url}")));
        }
        if !status.is_success() {
            return Err(ScraperError::Network(format!("HTTP {status} for {url}")));
        }
        Ok(resp.text()?)
    }
}

impl RatingSite for TripAdvisor {
    fn source_tag(&self) -> SourceTag {
        SourceTag::TripAdvisor
    }

    fn fetch_listings(
        &self,
        locale: &str,
        max_count: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<Listing>, ScraperError> {
        let base = self.locate_town_page(locale)?;
        let urls = page_urls(&base, max_count)?;
        debug!("tripadvisor: {} list pages for '{locale}'", urls.len());

        let pages = map_bounded(&urls, self.page_workers, |url| {
            self.fetch_html(url, cancel)
                .and_then(|html| parse_restaurants(&html))
        })
        .map_err(|e| ScraperError::Network(e.to_string()))?;

        if cancel.is_cancelled() {
            return Err(ScraperError::Cancelled);
        }

        let mut first_err = None;
        let mut seen = HashSet::new();
        let mut listings = Vec::new();
        for (url, page) in urls.iter().zip(pages) {
            match page {
                Ok(found) => listings.extend(
                    found
                        .into_iter()
                        .filter(|listing| seen.insert(listing.link.clone())),
                ),
                Err(e) => {
                    warn!("tripadvisor: skipping page {url}: {e}");
                    first_err.get_or_insert(e);
                }
            }
        }

        if listings.is_empty() {
            if let Some(e) = first_err {
                return Err(e);
            }
        }

        listings.truncate(max_count);
        info!("tripadvisor: {} listings for '{locale}'", listings.len());
        Ok(listings)
    }
}

fn town_page_link(results: &SearchResponse) -> Option<String> {
    results
        .items
        .iter()
        .find(|item| item.title.to_lowercase().contains(TOWN_PAGE_TITLE))
        .map(|item| item.link.clone())
}

/// List page urls covering `max_count` entries. Each page offset goes in
/// right after the `-g<id>` location segment.
pub fn page_urls(base: &str, max_count: usize) -> Result<Vec<String>, ScraperError> {
    let location = Regex::new(r"-g[0-9]+").map_err(|e| ScraperError::Config(e.to_string()))?;
    let found = location.find(base).ok_or_else(|| {
        ScraperError::UnexpectedShape(format!("no location id in {base}"))
    })?;

    let (head, tail) = base.split_at(found.end());
    Ok((0..max_count)
        .step_by(PAGE_SIZE)
        .map(|offset| format!("{head}-oa{offset}{tail}"))
        .collect())
}

/// Pulls listings out of the JSON blob embedded in a list page.
pub fn parse_restaurants(html: &str) -> Result<Vec<Listing>, ScraperError> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("script").map_err(|e| ScraperError::HtmlParse(e.to_string()))?;

    let script = document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .find(|text| text.contains(DATA_MARKER))
        .ok_or_else(|| ScraperError::UnexpectedShape("no restaurant data script".into()))?;

    let start = script
        .find(LIST_START)
        .ok_or_else(|| ScraperError::UnexpectedShape("restaurant list not found".into()))?;

    // The object is followed by more script, so only the first value is read.
    let value = serde_json::Deserializer::from_str(&script[start..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| ScraperError::JsonParse("empty restaurant list".into()))?
        .map_err(|e| ScraperError::JsonParse(e.to_string()))?;

    let list: RestaurantList =
        serde_json::from_value(value).map_err(|e| ScraperError::JsonParse(e.to_string()))?;

    Ok(list
        .restaurants
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<RestaurantEntry>(raw) {
            Ok(entry) => Some(Listing::from_native(
                entry.name,
                format!("{SITE_ROOT}{}", entry.detail_page_url),
                entry.average_rating,
                entry.user_review_count,
                SourceTag::TripAdvisor,
            )),
            Err(e) => {
                warn!("tripadvisor: skipping malformed entry: {e}");
                None
            }
        })
        .collect())
}
