// src/db/restaurants.rs
use crate::db::connection::Database;
use crate::db::mapping::{upsert, ColumnMapping, Persisted, TableMapping};
use crate::domain::{Listing, RankedRestaurant, SourceTag};
use crate::errors::ServerError;
use log::{debug, info};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Row};

fn opt_text(v: &Option<String>) -> Value {
    v.clone().map(Value::Text).unwrap_or(Value::Null)
}

fn opt_real(v: Option<f64>) -> Value {
    v.map(Value::Real).unwrap_or(Value::Null)
}

fn count(n: u64) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

fn opt_json(v: &Option<Vec<String>>) -> Value {
    v.as_ref()
        .and_then(|items| serde_json::to_string(items).ok())
        .map(Value::Text)
        .unwrap_or(Value::Null)
}

fn json_column(row: &Row, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoogleMapsRow {
    pub town: String,
    pub listing: Listing,
}

impl Persisted for GoogleMapsRow {
    const MAPPING: TableMapping = TableMapping {
        table: "google_maps",
        primary_key: &["link"],
        columns: &[
            ColumnMapping { field: "link", column: "link" },
            ColumnMapping { field: "town", column: "town" },
            ColumnMapping { field: "name", column: "name" },
            ColumnMapping { field: "rating", column: "rating" },
            ColumnMapping { field: "number_of_reviews", column: "number_of_reviews" },
            ColumnMapping { field: "formatted_address", column: "address" },
            ColumnMapping { field: "location_lat", column: "lat" },
            ColumnMapping { field: "location_lng", column: "lng" },
            ColumnMapping { field: "reviews", column: "reviews" },
            ColumnMapping { field: "photos", column: "photos" },
        ],
    };

    fn field_values(&self) -> Vec<Value> {
        let l = &self.listing;
        vec![
            Value::Text(l.link.clone()),
            Value::Text(self.town.clone()),
            Value::Text(l.name.clone()),
            Value::Real(l.rating),
            count(l.number_of_reviews),
            opt_text(&l.formatted_address),
            opt_real(l.location_lat),
            opt_real(l.location_lng),
            opt_json(&l.reviews),
            opt_json(&l.photos),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripAdvisorRow {
    pub town: String,
    pub listing: Listing,
}

impl Persisted for TripAdvisorRow {
    const MAPPING: TableMapping = TableMapping {
        table: "trip_advisor",
        primary_key: &["link"],
        columns: &[
            ColumnMapping { field: "link", column: "link" },
            ColumnMapping { field: "town", column: "town" },
            ColumnMapping { field: "name", column: "name" },
            ColumnMapping { field: "rating", column: "rating" },
            ColumnMapping { field: "number_of_reviews", column: "number_of_reviews" },
            ColumnMapping { field: "reviews", column: "reviews" },
            ColumnMapping { field: "photos", column: "photos" },
        ],
    };

    fn field_values(&self) -> Vec<Value> {
        let l = &self.listing;
        vec![
            Value::Text(l.link.clone()),
            Value::Text(self.town.clone()),
            Value::Text(l.name.clone()),
            Value::Real(l.rating),
            count(l.number_of_reviews),
            opt_json(&l.reviews),
            opt_json(&l.photos),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantRow {
    pub google_maps_link: String,
    pub trip_advisor_link: String,
    pub town: String,
    pub name: String,
    pub score: f64,
    pub review: Option<String>,
}

impl Persisted for RestaurantRow {
    const MAPPING: TableMapping = TableMapping {
        table: "restaurants",
        primary_key: &["google_maps_link", "trip_advisor_link"],
        columns: &[
            ColumnMapping { field: "google_maps_link", column: "google_maps_link" },
            ColumnMapping { field: "trip_advisor_link", column: "trip_advisor_link" },
            ColumnMapping { field: "town", column: "town" },
            ColumnMapping { field: "name", column: "name" },
            ColumnMapping { field: "score", column: "score" },
            ColumnMapping { field: "review", column: "review" },
        ],
    };

    fn field_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.google_maps_link.clone()),
            Value::Text(self.trip_advisor_link.clone()),
            Value::Text(self.town.clone()),
            Value::Text(self.name.clone()),
            Value::Real(self.score),
            opt_text(&self.review),
        ]
    }
}

/// Towns are stored trimmed and lowercased so lookups ignore case.
pub fn town_key(town: &str) -> String {
    town.trim().to_lowercase()
}

/// Replaces a town's stored ranking in a single transaction. Scores only
/// compare within one run, so rows from earlier runs are dropped first.
/// Restaurants missing a listing from either source are skipped. Returns
/// the number of restaurants written.
pub fn save_results(
    db: &Database,
    town: &str,
    results: &[RankedRestaurant],
) -> Result<usize, ServerError> {
    let town = town_key(town);

    let mut gm_rows = Vec::new();
    let mut ta_rows = Vec::new();
    let mut restaurant_rows = Vec::new();

    for restaurant in results {
        let (Some(gm), Some(ta)) = (
            restaurant.site(SourceTag::GoogleMaps),
            restaurant.site(SourceTag::TripAdvisor),
        ) else {
            debug!("Not storing '{}': listing from one source missing", restaurant.name);
            continue;
        };

        restaurant_rows.push(RestaurantRow {
            google_maps_link: gm.link.clone(),
            trip_advisor_link: ta.link.clone(),
            town: town.clone(),
            name: restaurant.name.clone(),
            score: restaurant.score,
            review: restaurant.review.clone(),
        });
        gm_rows.push(GoogleMapsRow {
            town: town.clone(),
            listing: gm.clone(),
        });
        ta_rows.push(TripAdvisorRow {
            town: town.clone(),
            listing: ta.clone(),
        });
    }

    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let replaced = tx
            .execute("DELETE FROM restaurants WHERE town = ?1", params![town])
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        debug!("Dropped {replaced} earlier restaurants for '{town}'");

        upsert(&tx, &gm_rows)?;
        upsert(&tx, &ta_rows)?;
        let written = upsert(&tx, &restaurant_rows)?;

        tx.commit()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        info!("Stored {written} restaurants for '{town}'");
        Ok(restaurant_rows.len())
    })
}

const RESULTS_QUERY: &str = "
    SELECT r.name, r.score, r.review,
           g.link, g.name, g.rating, g.number_of_reviews, g.address, g.lat, g.lng,
           g.reviews, g.photos,
           t.link, t.name, t.rating, t.number_of_reviews, t.reviews, t.photos
    FROM restaurants r
    JOIN google_maps g ON g.link = r.google_maps_link
    JOIN trip_advisor t ON t.link = r.trip_advisor_link
    WHERE r.town = ?1
    ORDER BY r.score DESC, r.name ASC
    LIMIT ?2";

fn ranked_from_row(row: &Row) -> rusqlite::Result<RankedRestaurant> {
    let mut gm = Listing::new(
        row.get::<_, String>(4)?,
        row.get::<_, String>(3)?,
        row.get(5)?,
        row.get::<_, i64>(6)?.max(0) as u64,
        SourceTag::GoogleMaps,
    );
    gm.formatted_address = row.get(7)?;
    gm.location_lat = row.get(8)?;
    gm.location_lng = row.get(9)?;
    gm.reviews = json_column(row, 10)?;
    gm.photos = json_column(row, 11)?;

    let mut ta = Listing::new(
        row.get::<_, String>(13)?,
        row.get::<_, String>(12)?,
        row.get(14)?,
        row.get::<_, i64>(15)?.max(0) as u64,
        SourceTag::TripAdvisor,
    );
    ta.reviews = json_column(row, 16)?;
    ta.photos = json_column(row, 17)?;

    Ok(RankedRestaurant {
        name: row.get(0)?,
        score: row.get(1)?,
        review: row.get(2)?,
        all_sites: vec![gm, ta],
    })
}

/// Stored ranking for a town, best first.
pub fn get_results_for_town(
    db: &Database,
    town: &str,
    limit: usize,
) -> Result<Vec<RankedRestaurant>, ServerError> {
    let town = town_key(town);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(RESULTS_QUERY)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(params![town, limit], ranked_from_row)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut results = Vec::new();
        for r in rows {
            results.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(results)
    })
}

pub fn get_supported_towns(db: &Database) -> Result<Vec<String>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare("SELECT DISTINCT town FROM restaurants ORDER BY town")
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut towns = Vec::new();
        for r in rows {
            towns.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(towns)
    })
}
