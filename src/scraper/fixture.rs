// fixture.rs
use crate::domain::{Listing, SourceTag};
use crate::scraper::{RatingSite, ScraperError};
use crate::workers::CancelToken;
use log::info;
use std::path::{Path, PathBuf};

/// Serves listings recorded as JSON under `{dir}/{source_tag}/{locale}.json`.
pub struct FixtureSite {
    tag: SourceTag,
    dir: PathBuf,
}

impl FixtureSite {
    pub fn new(tag: SourceTag, dir: impl Into<PathBuf>) -> Self {
        Self {
            tag,
            dir: dir.into(),
        }
    }

    pub fn path_for(&self, locale: &str) -> PathBuf {
        self.dir
            .join(self.tag.as_str())
            .join(format!("{}.json", locale_slug(locale)))
    }
}

impl RatingSite for FixtureSite {
    fn source_tag(&self) -> SourceTag {
        self.tag
    }

    fn fetch_listings(
        &self,
        locale: &str,
        max_count: usize,
        _cancel: &CancelToken,
    ) -> Result<Vec<Listing>, ScraperError> {
        let path = self.path_for(locale);
        let mut listings = read_listings(&path)?;

        for listing in listings.iter_mut() {
            listing.site = self.tag;
        }
        listings.truncate(max_count);

        info!(
            "fixture {}: {} listings for '{locale}'",
            self.tag,
            listings.len()
        );
        Ok(listings)
    }
}

fn read_listings(path: &Path) -> Result<Vec<Listing>, ScraperError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ScraperError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| ScraperError::JsonParse(format!("{}: {e}", path.display())))
}

/// "Saint-Paul de Vence" -> "saint_paul_de_vence"
pub fn locale_slug(locale: &str) -> String {
    locale
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("trip_advisor")).unwrap();
        dir
    }

    #[test]
    fn slug_replaces_separators() {
        assert_eq!(locale_slug("Saint-Paul de Vence"), "saint_paul_de_vence");
        assert_eq!(locale_slug(" Nice "), "nice");
    }

    #[test]
    fn reads_listings_and_stamps_source() {
        let dir = fixture_dir();
        let body = serde_json::json!([
            { "name": "Joes Diner", "link": "ta/1", "rating": 9.0, "number_of_reviews": 140, "site": "google_maps" },
            { "name": "Ace Pizzeria", "link": "ta/2", "rating": 8.0, "number_of_reviews": 12, "site": "trip_advisor" }
        ]);
        std::fs::write(
            dir.path().join("trip_advisor").join("springfield.json"),
            body.to_string(),
        )
        .unwrap();

        let site = FixtureSite::new(SourceTag::TripAdvisor, dir.path());
        let listings = site
            .fetch_listings("Springfield", 1, &CancelToken::new())
            .unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].site, SourceTag::TripAdvisor);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = fixture_dir();
        let site = FixtureSite::new(SourceTag::TripAdvisor, dir.path());
        assert!(matches!(
            site.fetch_listings("Nowhere", 10, &CancelToken::new()),
            Err(ScraperError::Io(_))
        ));
    }
}
