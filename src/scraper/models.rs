use serde::Deserialize;
use serde_json::Value;

// Places text search
//  ├── status
//  ├── error_message
//  ├── next_page_token
//  └── results[]
//       ├── name
//       ├── place_id
//       ├── rating
//       ├── user_ratings_total
//       ├── formatted_address
//       └── geometry
//            └── location
//                 ├── lat
//                 └── lng
//
// Results are kept as raw values so one malformed entry can be skipped
// without losing the page.

#[derive(Debug, Deserialize)]
pub struct PlacesPage {
    pub status: Option<String>,
    pub error_message: Option<String>,
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct FindPlaceResponse {
    pub status: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Place {
    pub name: String,
    pub place_id: String,
    pub rating: f64,
    pub user_ratings_total: u64,
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: Option<Coordinate>,
}

#[derive(Debug, Deserialize)]
pub struct Coordinate {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

// Place details
//  └── result
//       ├── reviews[]
//       │    └── text
//       └── photos[]
//            └── photo_reference

#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    pub status: Option<String>,
    pub result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub reviews: Vec<PlaceReview>,
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceReview {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PlacePhoto {
    pub photo_reference: String,
}

// Custom search
//  └── items[]
//       ├── title
//       └── link

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub link: String,
}

// Travel site list page, embedded in a <script>
//  └── restaurants[]
//       ├── name
//       ├── detailPageUrl
//       ├── averageRating
//       └── userReviewCount

#[derive(Debug, Deserialize)]
pub struct RestaurantList {
    #[serde(default)]
    pub restaurants: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantEntry {
    pub name: String,
    pub detail_page_url: String,
    pub average_rating: f64,
    pub user_review_count: u64,
}
