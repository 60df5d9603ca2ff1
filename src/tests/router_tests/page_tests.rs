// src/tests/router_tests/page_tests.rs

use super::springfield_state;
use crate::db::save_results;
use crate::domain::{RankedRestaurant, SourceTag};
use crate::router::handle;
use crate::tests::utils::{body_string, get, listing};

#[test]
fn home_page_lists_collected_towns() {
    let (state, _dir) = springfield_state("page_home");

    let resp = handle(get("/"), &state);
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("Nothing collected yet."));

    assert_eq!(handle(get("/aggregate?town=Springfield"), &state).status(), 200);

    let body = body_string(handle(get("/"), &state));
    assert!(body.contains("/town?town=springfield"));
}

#[test]
fn town_page_renders_cards_in_rank_order() {
    let (state, _dir) = springfield_state("page_town");
    assert_eq!(handle(get("/aggregate?town=Springfield"), &state).status(), 200);

    let resp = handle(get("/town?town=Springfield"), &state);
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    let diner = body.find("1. Joe&#39;s Diner").or_else(|| body.find("1. Joe's Diner"));
    let pizza = body.find("2. Ace Pizza");
    assert!(diner.is_some());
    assert!(pizza.is_some());
    assert!(!body.contains("Mall Food Court"));
}

#[test]
fn stored_photo_is_shown_on_the_town_page() {
    let (state, _dir) = springfield_state("page_photo");
    let mut gm = listing("Joe's Diner", 9.0, 850, SourceTag::GoogleMaps);
    gm.photos = Some(vec!["aGVsbG8=".to_string()]);
    let ta = listing("Joes Diner", 9.0, 210, SourceTag::TripAdvisor);
    let ranked = RankedRestaurant {
        name: "Joe's Diner".to_string(),
        score: 5.0,
        review: None,
        all_sites: vec![gm, ta],
    };
    save_results(&state.db, "Springfield", &[ranked]).unwrap();

    let body = body_string(handle(get("/town?town=Springfield"), &state));
    assert!(body.contains("data:image/jpeg;base64,aGVsbG8="));
}

#[test]
fn page_errors_render_as_html() {
    let (state, _dir) = springfield_state("page_errors");

    let resp = handle(get("/town?town=Nowhere"), &state);
    assert_eq!(resp.status(), 404);
    let content_type = resp
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(body_string(resp).contains("Error 404"));

    assert_eq!(handle(get("/no-such-page"), &state).status(), 404);
    assert_eq!(handle(get("/town"), &state).status(), 400);
}

#[test]
fn export_serves_a_workbook() {
    let (state, _dir) = springfield_state("page_export");
    assert_eq!(handle(get("/export?town=Springfield"), &state).status(), 404);
    assert_eq!(handle(get("/aggregate?town=Springfield"), &state).status(), 200);

    let resp = handle(get("/export?town=Springfield"), &state);
    assert_eq!(resp.status(), 200);
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(disposition.contains("restaurants_springfield.xlsx"));
}
