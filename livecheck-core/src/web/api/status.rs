use super::*;

use crate::models::ShowStatus;

/// Gets the latest aggregated show status.
///
/// The answer merges every listing source that responded on the last polling
/// round; when none did, it falls back to the schedule calculator and the
/// confidence drops accordingly.
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "OK", body = ShowStatus),
        (status = 500, description = "Internal Server Error"),
    ),
)]
pub(super) async fn get(
    State(StatusExtractor(status)): State<StatusExtractor>,
) -> Result<Json<ShowStatus>, Error> {
    Ok(Json(status.borrow().clone()))
}
