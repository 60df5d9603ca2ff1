use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "restaurant_ratings")]
#[command(about = "Rank restaurants by merging ratings from several review sites.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default bind from BIND_ADDR)
    Serve {
        /// Listen address, overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,

        /// Server worker threads
        #[arg(long, default_value_t = 8)]
        workers: usize,
    },
    /// Collect and store rankings for each town, one after another
    Collect {
        /// Towns to collect, e.g. "nice france"
        towns: Vec<String>,

        /// File with one town per line; blank lines and '#' comments are skipped
        #[arg(long)]
        towns_file: Option<PathBuf>,
    },
    /// Print a town's ranking as JSON
    Query {
        town: String,

        /// Number of restaurants (default: RESULT_LIMIT)
        #[arg(long)]
        limit: Option<usize>,

        /// Aggregate now instead of reading stored results
        #[arg(long)]
        live: bool,
    },
}

/// Towns listed in a towns file.
pub fn parse_towns_file(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
