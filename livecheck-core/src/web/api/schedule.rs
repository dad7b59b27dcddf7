use chrono::DateTime;
use chrono_et::Et;

use super::*;

const DEFAULT_UPCOMING: usize = 5;
const MAX_UPCOMING: usize = 26;

/// Gets the computed schedule facts for an instant.
///
/// `at` evaluates the schedule at an arbitrary RFC 3339 instant, which is
/// handy for checking what the site will say on a future night.
#[utoipa::path(
    get,
    path = "/schedule",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "OK", body = WebSchedule),
        (status = 400, description = "Bad Request"),
    ),
)]
pub(super) async fn get(
    State(SchedulerExtractor(scheduler)): State<SchedulerExtractor>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<WebSchedule>, Error> {
    let now = match query.at {
        Some(ref at) => DateTime::parse_from_rfc3339(at)
            .map_err(|_| Error::InvalidInstant)?
            .with_timezone(&Et),
        None => Et::now(),
    };
    let count = query.upcoming.unwrap_or(DEFAULT_UPCOMING).min(MAX_UPCOMING);
    let snapshot = scheduler.snapshot(&now);
    let upcoming = scheduler.upcoming(&now, count);
    Ok(Json(WebSchedule::new(now, snapshot, upcoming)))
}
