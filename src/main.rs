use crate::cli::{parse_towns_file, Cli, Command};
use crate::config::Config;
use crate::db::{get_results_for_town, init_db, Database};
use crate::merge::{aggregate_with_timeout, run_batch, MergeEngine};
use crate::router::{handle, AppState};
use astra::Server;
use clap::Parser;
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;

mod cli;
mod config;
mod db;
mod domain;
mod errors;
mod matching;
mod merge;
mod responses;
mod review;
mod router;
mod scoring;
mod scraper;
mod spreadsheets;
mod templates;
mod workers;

#[cfg(test)]
mod tests;

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let config = Config::from_env()?;

    // 1️⃣ Database from schema.sql
    let db = Database::new(config.database_path.clone());
    init_db(&db, &config.schema_path)?;

    // 2️⃣ Providers, primary source first
    let sites = config.build_sites()?;
    let engine = Arc::new(MergeEngine::new(
        sites,
        config.score_calculator(),
        config.merge_settings(),
    ));

    match cli.command {
        Command::Serve { bind, workers } => serve(config, db, engine, bind, workers),
        Command::Collect { towns, towns_file } => {
            let mut all = towns;
            if let Some(path) = towns_file {
                all.extend(parse_towns_file(&std::fs::read_to_string(path)?));
            }
            if all.is_empty() {
                return Err("no towns given".into());
            }

            let summary = run_batch(engine, &all, config.locale_timeout, &db);
            for (town, stored) in &summary.succeeded {
                println!("ok      {town}: {stored} restaurants");
            }
            for (town, reason) in &summary.failed {
                println!("failed  {town}: {reason}");
            }
            if summary.is_success() {
                Ok(())
            } else {
                Err(format!("{} of {} towns failed", summary.failed.len(), all.len()).into())
            }
        }
        Command::Query { town, limit, live } => {
            let restaurants = if live {
                aggregate_with_timeout(engine, &town, limit, config.locale_timeout)?
            } else {
                get_results_for_town(&db, &town, limit.unwrap_or(config.result_limit))?
            };
            println!("{}", serde_json::to_string_pretty(&restaurants)?);
            Ok(())
        }
    }
}

fn serve(
    config: Config,
    db: Database,
    engine: Arc<MergeEngine>,
    bind: Option<String>,
    workers: usize,
) -> AppResult<()> {
    let addr: SocketAddr = bind.unwrap_or(config.bind_addr).parse()?;
    info!("Starting server at http://{addr}");

    let state = AppState {
        db,
        engine,
        cors_origin: config.cors_origin,
        locale_timeout: config.locale_timeout,
    };

    let server = Server::bind(&addr).max_workers(workers.max(1));
    server.serve(move |req, _info| handle(req, &state))?;

    info!("Server shut down cleanly.");
    Ok(())
}
