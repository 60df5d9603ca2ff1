// src/merge/mod.rs

pub mod batch;
pub mod engine;

pub use batch::{aggregate_with_timeout, run_batch, BatchSummary};
pub use engine::{MergeEngine, MergeSettings, RequiredSources};

use crate::domain::SourceTag;
use crate::scoring::ScoreError;
use crate::scraper::ScraperError;
use crate::workers::WorkerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("fetching from {source_tag} failed: {error}")]
    Fetch {
        source_tag: SourceTag,
        error: ScraperError,
    },
    #[error("scoring failed: {0}")]
    Score(#[from] ScoreError),
    #[error("aggregation for '{locale}' timed out after {seconds}s")]
    Timeout { locale: String, seconds: u64 },
    #[error("aggregation cancelled")]
    Cancelled,
    #[error("aggregation worker failed: {0}")]
    Worker(#[from] WorkerError),
}
