use super::*;
use crate::web::api::models::Version;

/// Gets version information.
#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "OK", body = Version),
    ),
)]
pub(super) async fn get() -> impl IntoResponse {
    Json(Version {
        current: env!("CARGO_PKG_VERSION"),
    })
}
