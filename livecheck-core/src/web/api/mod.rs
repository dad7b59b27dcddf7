use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing;
use utoipa::OpenApi;

use crate::error::Error;

use super::AppState;
use super::SchedulerExtractor;
use super::StatusExtractor;

mod schedule;
mod status;
mod version;

pub(super) mod models;
use models::*;

pub(super) fn build_api() -> Router<Arc<AppState>> {
    Router::new()
        .route("/version", routing::get(version::get))
        .route("/status", routing::get(status::get))
        .route("/schedule", routing::get(schedule::get))
}

// docs

#[derive(OpenApi)]
#[openapi(
    paths(schedule::get, status::get, version::get),
    info(title = "livecheck Web API")
)]
pub(super) struct Docs;

impl Docs {
    pub(super) fn generate() -> utoipa::openapi::OpenApi {
        Docs::openapi()
    }
}
