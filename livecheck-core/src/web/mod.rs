use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use axum::http::HeaderValue;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::SERVER;
use tokio::sync::watch;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::error::Error;
use crate::models::ShowStatus;
use crate::schedule::Scheduler;

// macros

macro_rules! header_value {
    ($v:literal) => {
        HeaderValue::from_static($v)
    };
    ($v:expr) => {
        HeaderValue::from_str(&$v).unwrap()
    };
}

mod api;
mod error;
mod server;

#[cfg(test)]
mod tests;

pub async fn serve(
    config: Arc<Config>,
    scheduler: Scheduler,
    status: watch::Receiver<ShowStatus>,
) -> Result<(), Error> {
    let app = build_app().with_state(Arc::new(AppState { scheduler, status }));
    server::serve(config, app).await
}

// endpoints

fn build_app() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api::build_api())
        .merge(SwaggerUi::new("/api/debug").url("/api/docs", api::Docs::generate()))
        // The status ages out quickly, don't let clients cache it.
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            header_value!("no-store"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            SERVER,
            header_value!(server_name()),
        ))
        // Output tracing logs.
        .layer(TraceLayer::new_for_http())
}

// state and extractors

struct AppState {
    scheduler: Scheduler,
    status: watch::Receiver<ShowStatus>,
}

struct SchedulerExtractor(Scheduler);

impl FromRef<Arc<AppState>> for SchedulerExtractor {
    fn from_ref(state: &Arc<AppState>) -> Self {
        Self(state.scheduler.clone())
    }
}

struct StatusExtractor(watch::Receiver<ShowStatus>);

impl FromRef<Arc<AppState>> for StatusExtractor {
    fn from_ref(state: &Arc<AppState>) -> Self {
        Self(state.status.clone())
    }
}

// helpers

fn server_name() -> String {
    format!("livecheck/{}", env!("CARGO_PKG_VERSION"))
}
