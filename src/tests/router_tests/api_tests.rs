// src/tests/router_tests/api_tests.rs

use super::{springfield_state, ORIGIN};
use crate::domain::RankedRestaurant;
use crate::router::handle;
use crate::tests::utils::{body_string, get};
use serde_json::Value;

fn cors(resp: &astra::Response) -> Option<&str> {
    resp.headers()
        .get("Access-Control-Allow-Origin")
        .and_then(|v| v.to_str().ok())
}

#[test]
fn aggregate_then_read_back_stored_results() {
    let (state, _dir) = springfield_state("api_aggregate");

    let resp = handle(get("/aggregate?town=Springfield"), &state);
    assert_eq!(resp.status(), 200);
    assert_eq!(cors(&resp), Some(ORIGIN));
    let live: Vec<RankedRestaurant> = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(live.len(), 2);

    let resp = handle(get("/restaurants?town=springfield&limit=1"), &state);
    assert_eq!(resp.status(), 200);
    let stored: Value = serde_json::from_str(&body_string(resp)).unwrap();
    let stored = stored.as_array().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["name"], "Joe's Diner");
    assert_eq!(stored[0]["all_sites"][0]["site"], "google_maps");
    assert_eq!(stored[0]["all_sites"][1]["name"], "Joes Diner");
    assert!(stored[0]["score"].as_f64().is_some());

    let resp = handle(get("/all_supported_towns"), &state);
    assert_eq!(resp.status(), 200);
    let towns: Vec<String> = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(towns, vec!["springfield"]);
}

#[test]
fn encoded_town_names_are_decoded() {
    let (state, _dir) = springfield_state("api_encoded");
    let resp = handle(get("/aggregate?town=Springfield%20USA"), &state);
    assert_eq!(resp.status(), 200);

    let resp = handle(get("/all_supported_towns"), &state);
    let towns: Vec<String> = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(towns, vec!["springfield usa"]);
}

#[test]
fn unknown_town_is_a_json_404() {
    let (state, _dir) = springfield_state("api_unknown");
    let resp = handle(get("/restaurants?town=Shelbyville"), &state);
    assert_eq!(resp.status(), 404);
    assert_eq!(cors(&resp), Some(ORIGIN));
    let body: Value = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(body["error"], "Not Found");
}

#[test]
fn bad_parameters_are_400() {
    let (state, _dir) = springfield_state("api_bad_params");

    let resp = handle(get("/restaurants"), &state);
    assert_eq!(resp.status(), 400);
    let body: Value = serde_json::from_str(&body_string(resp)).unwrap();
    assert!(body["error"].as_str().unwrap().contains("town"));

    let resp = handle(get("/aggregate?town=Springfield&limit=zero"), &state);
    assert_eq!(resp.status(), 400);

    let resp = handle(get("/restaurants?town=Springfield&limit=0"), &state);
    assert_eq!(resp.status(), 400);
}

#[test]
fn empty_database_has_no_towns() {
    let (state, _dir) = springfield_state("api_no_towns");
    let resp = handle(get("/all_supported_towns"), &state);
    assert_eq!(resp.status(), 200);
    assert_eq!(body_string(resp), "[]");
}
