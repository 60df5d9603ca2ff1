mod fixture;
mod google_maps;
mod models;
mod scraper_error;
mod site;
mod tripadvisor;

pub use fixture::{locale_slug, FixtureSite};
pub use google_maps::GoogleMaps;
pub use scraper_error::ScraperError;
pub use site::RatingSite;
pub use tripadvisor::TripAdvisor;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";
