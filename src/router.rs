use crate::db::{get_recent_runs, get_results_for_town, get_supported_towns, save_results, Database};
use crate::domain::RankedRestaurant;
use crate::errors::ServerError;
use crate::merge::{aggregate_with_timeout, MergeEngine};
use crate::responses::{
    html_error_response, html_response, json_error_response, json_response, ResultResp,
};
use crate::spreadsheets::export_restaurants_xlsx;
use crate::templates;
use astra::{Request, Response};
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const RECENT_RUNS: usize = 10;
const EXPORT_LIMIT: usize = 1000;

/// Everything a request handler needs, shared by all server workers.
pub struct AppState {
    pub db: Database,
    pub engine: Arc<MergeEngine>,
    pub cors_origin: String,
    pub locale_timeout: Duration,
}

impl AppState {
    fn result_limit(&self) -> usize {
        self.engine.settings().result_limit
    }
}

fn is_json_route(path: &str) -> bool {
    matches!(path, "/restaurants" | "/aggregate" | "/all_supported_towns")
}

/// Routes a request and renders any error in the route's own format.
pub fn handle(req: Request, state: &AppState) -> Response {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    match route(req, state) {
        Ok(resp) => resp,
        Err(err) => {
            if err.status() >= 500 {
                warn!("{method} {path} failed: {err}");
            }
            if is_json_route(&path) {
                json_error_response(&err, &state.cors_origin)
            } else {
                html_error_response(&err)
            }
        }
    }
}

fn route(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();
    let params = parse_query(&req);

    match (method, path) {
        ("GET", "/") => {
            let towns = get_supported_towns(&state.db)?;
            let runs = get_recent_runs(&state.db, RECENT_RUNS)?;
            html_response(templates::pages::home_page(&towns, &runs))
        }
        ("GET", "/town") => {
            let town = required_town(&params)?;
            let restaurants = stored_results(state, town, state.result_limit())?;
            html_response(templates::pages::town_page(town, &restaurants))
        }
        ("GET", "/restaurants") => {
            let town = required_town(&params)?;
            let limit = parse_limit(&params)?.unwrap_or(state.result_limit());
            let restaurants = stored_results(state, town, limit)?;
            json_response(&restaurants, &state.cors_origin)
        }
        ("GET", "/aggregate") => {
            let town = required_town(&params)?;
            let limit = parse_limit(&params)?;
            let restaurants =
                aggregate_with_timeout(Arc::clone(&state.engine), town, limit, state.locale_timeout)?;
            let stored = save_results(&state.db, town, &restaurants)?;
            info!("Aggregated '{town}': {} ranked, {stored} stored", restaurants.len());
            json_response(&restaurants, &state.cors_origin)
        }
        ("GET", "/all_supported_towns") => {
            let towns = get_supported_towns(&state.db)?;
            json_response(&towns, &state.cors_origin)
        }
        ("GET", "/export") => {
            let town = required_town(&params)?;
            let restaurants = stored_results(state, town, EXPORT_LIMIT)?;
            export_restaurants_xlsx(&restaurants, town)
        }
        _ => Err(ServerError::NotFound),
    }
}

fn stored_results(
    state: &AppState,
    town: &str,
    limit: usize,
) -> Result<Vec<RankedRestaurant>, ServerError> {
    let restaurants = get_results_for_town(&state.db, town, limit)?;
    if restaurants.is_empty() {
        return Err(ServerError::NotFound);
    }
    Ok(restaurants)
}

fn required_town(params: &HashMap<String, String>) -> Result<&str, ServerError> {
    params
        .get("town")
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServerError::BadRequest("missing 'town' parameter".into()))
}

fn parse_limit(params: &HashMap<String, String>) -> Result<Option<usize>, ServerError> {
    match params.get("limit") {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ServerError::BadRequest(format!("invalid limit '{raw}'"))),
        },
    }
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
