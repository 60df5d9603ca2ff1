// config.rs
use crate::domain::SourceTag;
use crate::merge::{MergeSettings, RequiredSources};
use crate::review::ReviewPolicy;
use crate::scoring::{Damping, ScoreCalculator, ScoreWeights};
use crate::scraper::{FixtureSite, GoogleMaps, RatingSite, ScraperError, TripAdvisor};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SEARCH_ENGINE_ID: &str = "011204893081168402867:xebeg1mi0om";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("could not build provider: {0}")]
    Provider(#[from] ScraperError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Live,
    Fixture,
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(SourceMode::Live),
            "fixture" => Ok(SourceMode::Fixture),
            other => Err(format!("unknown source mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub search_engine_id: String,
    pub database_path: String,
    pub schema_path: String,
    pub bind_addr: String,
    pub cors_origin: String,
    pub source_mode: SourceMode,
    pub fixture_dir: PathBuf,
    pub fetch_count: usize,
    pub top_k: usize,
    pub result_limit: usize,
    pub locale_timeout: Duration,
    pub page_workers: usize,
    pub page_delay: Duration,
    pub quality_weight: f64,
    pub popularity_weight: f64,
    pub damping: Damping,
    pub required: RequiredSources,
    pub review_policy: ReviewPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            search_engine_id: DEFAULT_SEARCH_ENGINE_ID.to_string(),
            database_path: "ratings.sqlite3".to_string(),
            schema_path: "sql/schema.sql".to_string(),
            bind_addr: "127.0.0.1:5000".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            source_mode: SourceMode::Live,
            fixture_dir: PathBuf::from("fixtures"),
            fetch_count: 200,
            top_k: 60,
            result_limit: 10,
            locale_timeout: Duration::from_secs(300),
            page_workers: 10,
            page_delay: Duration::from_secs(2),
            quality_weight: 0.6,
            popularity_weight: 0.4,
            damping: Damping::None,
            required: RequiredSources::All,
            review_policy: ReviewPolicy::default(),
        }
    }
}

fn parse<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}

fn positive(key: &'static str, raw: Option<String>, default: usize) -> Result<usize, ConfigError> {
    let n = parse(key, raw, default)?;
    if n == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: n.to_string(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(n)
}

fn weight(key: &'static str, raw: Option<String>, default: f64) -> Result<f64, ConfigError> {
    let w: f64 = parse(key, raw, default)?;
    if !w.is_finite() || w < 0.0 {
        return Err(ConfigError::Invalid {
            key,
            value: w.to_string(),
            reason: "must be a non-negative number".into(),
        });
    }
    Ok(w)
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset keys take their default;
    /// set but unparsable keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let d = Config::default();

        let config = Config {
            api_key: get("API_KEY"),
            search_engine_id: get("SEARCH_ENGINE_ID").unwrap_or(d.search_engine_id),
            database_path: get("DATABASE_PATH").unwrap_or(d.database_path),
            schema_path: get("SCHEMA_PATH").unwrap_or(d.schema_path),
            bind_addr: get("BIND_ADDR").unwrap_or(d.bind_addr),
            cors_origin: get("CORS_ORIGIN").unwrap_or(d.cors_origin),
            source_mode: parse("SOURCE_MODE", get("SOURCE_MODE"), d.source_mode)?,
            fixture_dir: get("FIXTURE_DIR").map(PathBuf::from).unwrap_or(d.fixture_dir),
            fetch_count: positive("FETCH_COUNT", get("FETCH_COUNT"), d.fetch_count)?,
            top_k: positive("TOP_K", get("TOP_K"), d.top_k)?,
            result_limit: positive("RESULT_LIMIT", get("RESULT_LIMIT"), d.result_limit)?,
            locale_timeout: Duration::from_secs(positive(
                "LOCALE_TIMEOUT_SECS",
                get("LOCALE_TIMEOUT_SECS"),
                d.locale_timeout.as_secs() as usize,
            )? as u64),
            page_workers: positive("PAGE_WORKERS", get("PAGE_WORKERS"), d.page_workers)?,
            page_delay: Duration::from_secs(parse(
                "PAGE_DELAY_SECS",
                get("PAGE_DELAY_SECS"),
                d.page_delay.as_secs(),
            )?),
            quality_weight: weight("QUALITY_WEIGHT", get("QUALITY_WEIGHT"), d.quality_weight)?,
            popularity_weight: weight(
                "POPULARITY_WEIGHT",
                get("POPULARITY_WEIGHT"),
                d.popularity_weight,
            )?,
            damping: parse("SCORE_DAMPING", get("SCORE_DAMPING"), d.damping)?,
            required: parse("REQUIRED_SOURCES", get("REQUIRED_SOURCES"), d.required)?,
            review_policy: parse("REVIEW_POLICY", get("REVIEW_POLICY"), d.review_policy)?,
        };

        if config.source_mode == SourceMode::Live && config.api_key.is_none() {
            return Err(ConfigError::Missing("API_KEY"));
        }

        Ok(config)
    }

    pub fn score_calculator(&self) -> ScoreCalculator {
        ScoreCalculator::new(
            ScoreWeights {
                quality: self.quality_weight,
                popularity: self.popularity_weight,
            },
            self.damping,
        )
    }

    pub fn merge_settings(&self) -> MergeSettings {
        MergeSettings {
            fetch_count: self.fetch_count,
            top_k: self.top_k,
            result_limit: self.result_limit,
            required: self.required,
            review_policy: self.review_policy,
            complete_details: self.source_mode == SourceMode::Live,
        }
    }

    /// Providers in declaration order; the first is the primary source.
    pub fn build_sites(&self) -> Result<Vec<Arc<dyn RatingSite>>, ConfigError> {
        match self.source_mode {
            SourceMode::Fixture => Ok(SourceTag::ALL
                .iter()
                .map(|tag| {
                    Arc::new(FixtureSite::new(*tag, self.fixture_dir.clone())) as Arc<dyn RatingSite>
                })
                .collect()),
            SourceMode::Live => {
                let api_key = self.api_key.clone().ok_or(ConfigError::Missing("API_KEY"))?;
                let google: Arc<dyn RatingSite> =
                    Arc::new(GoogleMaps::new(api_key.clone(), self.page_delay)?);
                let trip: Arc<dyn RatingSite> = Arc::new(TripAdvisor::new(
                    api_key,
                    self.search_engine_id.clone(),
                    self.page_workers,
                )?);
                Ok(vec![google, trip])
            }
        }
    }
}
