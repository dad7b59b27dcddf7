use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::body::to_bytes;
use axum::http::Request;
use axum::http::StatusCode;
use chrono::NaiveDate;
use chrono::Utc;
use test_log::test;
use tokio::sync::watch;
use tower::ServiceExt;

use crate::models::Person;
use crate::models::ShowStatus;
use crate::schedule::HiatusWindow;
use crate::schedule::RecurrenceRule;
use crate::schedule::Scheduler;

use super::*;

fn show_status() -> ShowStatus {
    ShowStatus {
        is_live: true,
        show_date: NaiveDate::from_ymd_opt(2024, 11, 16),
        host: Some(Person::named("Charli XCX")),
        musical_guest: Some(Person::named("Troye Sivan")),
        confidence: 0.9,
        sources: vec!["tvmaze".to_string()],
        last_updated: Utc::now(),
    }
}

fn app() -> Router {
    let scheduler = Scheduler::new(
        RecurrenceRule::new(6, 23, 30, 90).unwrap(),
        vec![HiatusWindow::new(6, 1, 10, 1).unwrap()],
    );
    let (_sender, status) = watch::channel(show_status());
    build_app().with_state(Arc::new(AppState { scheduler, status }))
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[test(tokio::test)]
async fn test_version() {
    let (status, json) = get("/api/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current"], env!("CARGO_PKG_VERSION"));
}

#[test(tokio::test)]
async fn test_status() {
    let (status, json) = get("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isLive"], true);
    assert_eq!(json["host"]["name"], "Charli XCX");
    assert_eq!(json["musicalGuest"]["name"], "Troye Sivan");
    assert_eq!(json["confidence"], 0.9);
    assert_eq!(json["sources"][0], "tvmaze");
}

#[test(tokio::test)]
async fn test_schedule_before_the_show() {
    // Saturday 22:00 ET.
    let (status, json) = get("/api/schedule?at=2024-11-16T22:00:00-05:00").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isLiveNow"], false);
    assert_eq!(json["mode"], "rerun");
    assert_eq!(json["nextOccurrence"], "2024-11-16T23:30:00-05:00");
    assert_eq!(json["currentOccurrence"], "2024-11-09T23:30:00-05:00");
    assert_eq!(json["timeUntilNext"]["days"], 0);
    assert_eq!(json["timeUntilNext"]["hours"], 1);
    assert_eq!(json["timeUntilNext"]["minutes"], 30);
    assert_eq!(json["timeUntilNext"]["seconds"], 0);
}

#[test(tokio::test)]
async fn test_schedule_during_the_show() {
    // Sunday 00:45 ET, inside the live window.
    let (status, json) = get("/api/schedule?at=2024-11-17T00:45:00-05:00").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isLiveNow"], true);
    assert_eq!(json["mode"], "live");
    assert_eq!(json["currentOccurrence"], "2024-11-16T23:30:00-05:00");
    assert_eq!(json["nextOccurrence"], "2024-11-23T23:30:00-05:00");
}

#[test(tokio::test)]
async fn test_schedule_hiatus_week() {
    let (status, json) = get("/api/schedule?at=2024-07-06T23:45:00-04:00").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isHiatusWeek"], true);
    assert_eq!(json["mode"], "hiatus");
}

#[test(tokio::test)]
async fn test_schedule_upcoming_skips_hiatus() {
    let (status, json) = get("/api/schedule?at=2024-05-20T12:00:00-04:00&upcoming=2").await;
    assert_eq!(status, StatusCode::OK);
    let upcoming = json["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0], "2024-05-25T23:30:00-04:00");
    assert_eq!(upcoming[1], "2024-10-05T23:30:00-04:00");
}

#[test(tokio::test)]
async fn test_schedule_upcoming_clamped() {
    let (status, json) = get("/api/schedule?at=2024-11-16T22:00:00-05:00&upcoming=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["upcoming"].as_array().unwrap().len(), 26);
}

#[test(tokio::test)]
async fn test_schedule_rejects_malformed_instant() {
    let (status, json) = get("/api/schedule?at=not-a-timestamp").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["reason"], "Invalid Instant");
}
