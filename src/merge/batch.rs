// src/merge/batch.rs

use crate::db::{end_collect_run, save_results, start_collect_run, Database};
use crate::domain::RankedRestaurant;
use crate::merge::{AggregateError, MergeEngine};
use crate::workers::{run_with_timeout, CancelToken, WorkerError};
use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

// Time a cancelled run gets to notice its token before the caller moves on.
const CANCEL_GRACE: Duration = Duration::from_secs(10);

/// Runs one locale's aggregation on its own thread. After `timeout` the run
/// is cancelled and reported as timed out.
pub fn aggregate_with_timeout(
    engine: Arc<MergeEngine>,
    locale: &str,
    limit: Option<usize>,
    timeout: Duration,
) -> Result<Vec<RankedRestaurant>, AggregateError> {
    let owned = locale.to_string();
    let job = move |cancel: &CancelToken| engine.aggregate(&owned, limit, cancel);
    match run_with_timeout(timeout, CANCEL_GRACE, job) {
        Ok(result) => result,
        Err(WorkerError::TimedOut(waited)) => Err(AggregateError::Timeout {
            locale: locale.to_string(),
            seconds: waited.as_secs(),
        }),
        Err(other) => Err(AggregateError::Worker(other)),
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSummary {
    /// Town and number of restaurants stored.
    pub succeeded: Vec<(String, usize)>,
    /// Town and the reason it failed.
    pub failed: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Collects and stores each town in turn. A failing town is logged and
/// recorded; the batch moves on to the next one.
pub fn run_batch(
    engine: Arc<MergeEngine>,
    towns: &[String],
    timeout: Duration,
    db: &Database,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for town in towns {
        let town = town.trim();
        if town.is_empty() {
            continue;
        }

        let run_id = match start_collect_run(db, town, Utc::now().timestamp()) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Could not record collect run for '{town}': {e}");
                None
            }
        };

        let outcome = aggregate_with_timeout(Arc::clone(&engine), town, None, timeout)
            .map_err(|e| e.to_string())
            .and_then(|results| save_results(db, town, &results).map_err(|e| e.to_string()));

        let (found, error_message) = match &outcome {
            Ok(stored) => {
                info!("Collected {stored} restaurants for '{town}'");
                summary.succeeded.push((town.to_string(), *stored));
                (*stored, None)
            }
            Err(reason) => {
                error!("Collecting '{town}' failed: {reason}");
                summary.failed.push((town.to_string(), reason.clone()));
                (0, Some(reason.clone()))
            }
        };

        if let Some(id) = run_id {
            let now = Utc::now().timestamp();
            if let Err(e) = end_collect_run(db, id, now, found, outcome.is_ok(), error_message) {
                warn!("Could not close collect run for '{town}': {e}");
            }
        }
    }

    info!(
        "Batch finished: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    summary
}
