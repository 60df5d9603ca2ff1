use crate::db::connection::{init_db, Database};
use crate::domain::{Listing, SourceTag};
use crate::scraper::{RatingSite, ScraperError};
use crate::workers::CancelToken;
use tempfile::TempDir;

/// Fresh database initialized from the production schema. The file lives
/// as long as the returned `TempDir`.
pub fn init_test_db(name: &str) -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{name}.sqlite"));
    let db = Database::new(path.to_string_lossy().into_owned());

    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    (db, dir)
}

/// Listing on the 0-10 scale with a link unique to its name and source
pub fn listing(name: &str, rating: f64, reviews: u64, site: SourceTag) -> Listing {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    Listing::new(name, format!("https://{}.test/{slug}", site.as_str()), rating, reviews, site)
}

/// In-memory provider: serves fixed listings, or always fails.
pub struct StaticSite {
    tag: SourceTag,
    listings: Vec<Listing>,
    error: Option<ScraperError>,
    reviews: Option<Vec<String>>,
}

impl StaticSite {
    pub fn new(tag: SourceTag, listings: Vec<Listing>) -> Self {
        Self {
            tag,
            listings,
            error: None,
            reviews: None,
        }
    }

    pub fn failing(tag: SourceTag, error: ScraperError) -> Self {
        Self {
            tag,
            listings: Vec::new(),
            error: Some(error),
            reviews: None,
        }
    }

    /// Detail completion fills in these reviews.
    pub fn with_reviews(mut self, reviews: Vec<String>) -> Self {
        self.reviews = Some(reviews);
        self
    }
}

impl RatingSite for StaticSite {
    fn source_tag(&self) -> SourceTag {
        self.tag
    }

    fn fetch_listings(
        &self,
        _locale: &str,
        max_count: usize,
        _cancel: &CancelToken,
    ) -> Result<Vec<Listing>, ScraperError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(self.listings.iter().take(max_count).cloned().collect())
    }

    fn complete_listing(&self, listing: &Listing) -> Listing {
        let mut completed = listing.clone();
        if let Some(reviews) = &self.reviews {
            completed.reviews = Some(reviews.clone());
        }
        completed
    }
}

pub fn get(uri: &str) -> astra::Request {
    let mut req = astra::Request::new(astra::Body::empty());
    *req.method_mut() = http::Method::GET;
    *req.uri_mut() = uri.parse().unwrap();
    req
}

pub fn body_string(mut resp: astra::Response) -> String {
    use std::io::Read;

    let mut body = Vec::new();
    resp.body_mut().reader().read_to_end(&mut body).unwrap();
    String::from_utf8(body).unwrap()
}

/// "Springfield": three places on the maps source, two on the travel site.
pub fn springfield_sites() -> (StaticSite, StaticSite) {
    let google = StaticSite::new(
        SourceTag::GoogleMaps,
        vec![
            listing("Joe's Diner", 9.0, 850, SourceTag::GoogleMaps),
            listing("Mall Food Court", 7.6, 1200, SourceTag::GoogleMaps),
            listing("Ace Pizza", 8.4, 95, SourceTag::GoogleMaps),
        ],
    );
    let trip = StaticSite::new(
        SourceTag::TripAdvisor,
        vec![
            listing("Joes Diner", 9.0, 210, SourceTag::TripAdvisor),
            listing("Ace Pizzeria", 8.0, 30, SourceTag::TripAdvisor),
        ],
    );
    (google, trip)
}
