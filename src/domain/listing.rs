// src/domain/listing.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The rating providers we know how to talk to.
/// Declaration order is the order sources are processed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    GoogleMaps,
    TripAdvisor,
}

impl SourceTag {
    pub const ALL: [SourceTag; 2] = [SourceTag::GoogleMaps, SourceTag::TripAdvisor];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::GoogleMaps => "google_maps",
            SourceTag::TripAdvisor => "trip_advisor",
        }
    }

    /// Factor that lifts the provider's native rating onto the shared 0-10 scale.
    /// Both providers rate on 0-5.
    pub fn rating_scale(&self) -> f64 {
        match self {
            SourceTag::GoogleMaps => 2.0,
            SourceTag::TripAdvisor => 2.0,
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google_maps" => Ok(SourceTag::GoogleMaps),
            "trip_advisor" => Ok(SourceTag::TripAdvisor),
            other => Err(format!("unknown source '{other}'")),
        }
    }
}

/// One restaurant as reported by a single source.
///
/// `rating` is always on the 0-10 scale. Use [`Listing::from_native`] when
/// building from a provider payload so the scale factor is applied exactly once.
/// The optional fields are filled by the provider's detail completion step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub link: String,
    pub rating: f64,
    pub number_of_reviews: u64,
    pub site: SourceTag,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<String>>,
    /// Base64 encoded images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
}

impl Listing {
    pub fn new(
        name: impl Into<String>,
        link: impl Into<String>,
        rating: f64,
        number_of_reviews: u64,
        site: SourceTag,
    ) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            rating,
            number_of_reviews,
            site,
            formatted_address: None,
            location_lat: None,
            location_lng: None,
            reviews: None,
            photos: None,
        }
    }

    /// Build from a provider's native rating, scaling it to 0-10.
    pub fn from_native(
        name: impl Into<String>,
        link: impl Into<String>,
        native_rating: f64,
        number_of_reviews: u64,
        site: SourceTag,
    ) -> Self {
        Self::new(
            name,
            link,
            native_rating * site.rating_scale(),
            number_of_reviews,
            site,
        )
    }

    pub fn is_completed(&self) -> bool {
        self.reviews.is_some() || self.photos.is_some()
    }
}
