mod api_tests;
mod page_tests;

use crate::merge::{MergeEngine, MergeSettings};
use crate::router::AppState;
use crate::scoring::ScoreCalculator;
use crate::scraper::RatingSite;
use crate::tests::utils::{init_test_db, springfield_sites};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const ORIGIN: &str = "http://localhost:3000";

/// App state over a fresh database and the in-memory Springfield sources
pub fn springfield_state(name: &str) -> (AppState, TempDir) {
    let (google, trip) = springfield_sites();
    let sites: Vec<Arc<dyn RatingSite>> = vec![Arc::new(google), Arc::new(trip)];
    let (db, dir) = init_test_db(name);

    let state = AppState {
        db,
        engine: Arc::new(MergeEngine::new(
            sites,
            ScoreCalculator::default(),
            MergeSettings::default(),
        )),
        cors_origin: ORIGIN.to_string(),
        locale_timeout: Duration::from_secs(10),
    };
    (state, dir)
}
