// templates/pages/home.rs

use crate::db::CollectRun;
use crate::templates::desktop_layout;
use chrono::DateTime;
use maud::{html, Markup};

fn timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn home_page(towns: &[String], runs: &[CollectRun]) -> Markup {
    desktop_layout(
        "Restaurant Ratings",
        html! {
            main class="container" {
                h1 { "Find the best restaurants in town" }

                form action="/town" method="get" class="card" {
                    label for="town" { "Town" }
                    " "
                    input type="text" id="town" name="town" list="known-towns" placeholder="nice france" required;
                    datalist id="known-towns" {
                        @for town in towns {
                            option value=(town) {}
                        }
                    }
                    " "
                    button type="submit" { "Show ranking" }
                }

                section class="card" {
                    h3 { "Supported towns" }
                    @if towns.is_empty() {
                        p { "Nothing collected yet." }
                    } @else {
                        ul {
                            @for town in towns {
                                li {
                                    a href=(format!("/town?town={}", url::form_urlencoded::byte_serialize(town.as_bytes()).collect::<String>())) { (town) }
                                }
                            }
                        }
                    }
                }

                @if !runs.is_empty() {
                    section class="card" {
                        h3 { "Recent collections" }
                        table style="width: 100%; border-collapse: collapse; font-size: 0.9em;" {
                            thead {
                                tr {
                                    th style="padding: 8px; text-align: left; border-bottom: 2px solid #eee;" { "Town" }
                                    th style="padding: 8px; text-align: left; border-bottom: 2px solid #eee;" { "Started" }
                                    th style="padding: 8px; text-align: left; border-bottom: 2px solid #eee;" { "Status" }
                                    th style="padding: 8px; text-align: left; border-bottom: 2px solid #eee;" { "Found" }
                                }
                            }
                            tbody {
                                @for run in runs {
                                    tr {
                                        td style="padding: 8px; border-bottom: 1px solid #f3f4f6;" { (run.town) }
                                        td style="padding: 8px; border-bottom: 1px solid #f3f4f6;" { (timestamp(run.started_at)) }
                                        td style="padding: 8px; border-bottom: 1px solid #f3f4f6;" {
                                            @if run.finished_at.is_none() {
                                                span style="color: #6b7280;" { "Running" }
                                            } @else if run.success {
                                                span style="color: #10b981;" { "OK" }
                                            } @else {
                                                span style="color: #ef4444;" title=[run.error_message.as_deref()] { "Failed" }
                                            }
                                        }
                                        td style="padding: 8px; border-bottom: 1px solid #f3f4f6;" {
                                            (run.restaurants_found.unwrap_or(0))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
