pub mod connection;
pub mod mapping;
pub mod restaurants;
pub mod runs;

pub use connection::{init_db, Database};
pub use restaurants::{get_results_for_town, get_supported_towns, save_results};
pub use runs::{end_collect_run, get_recent_runs, start_collect_run, CollectRun};
