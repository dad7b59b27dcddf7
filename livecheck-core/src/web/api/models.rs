use chrono::DateTime;
use chrono::FixedOffset;
use chrono_et::Et;
use serde::Deserialize;
use serde::Serialize;
use utoipa::IntoParams;
use utoipa::ToSchema;

use crate::schedule::ScheduleSnapshot;
use crate::schedule::TimeRemaining;

#[derive(Serialize, ToSchema)]
pub(in crate::web) struct Version {
    pub current: &'static str,
}

/// What tonight's broadcast is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(in crate::web) enum BroadcastMode {
    Live,
    Rerun,
    Hiatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(deny_unknown_fields)]
pub(in crate::web) struct ScheduleQuery {
    /// Evaluate the schedule at this RFC 3339 instant instead of now.
    pub at: Option<String>,
    /// How many upcoming occurrences to include.
    pub upcoming: Option<usize>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(in crate::web) struct WebSchedule {
    pub now: DateTime<FixedOffset>,
    pub current_occurrence: DateTime<FixedOffset>,
    pub next_occurrence: DateTime<FixedOffset>,
    pub is_live_now: bool,
    pub is_hiatus_week: bool,
    pub time_until_next: TimeRemaining,
    pub mode: BroadcastMode,
    pub upcoming: Vec<DateTime<FixedOffset>>,
}

impl WebSchedule {
    pub(in crate::web) fn new(
        now: DateTime<Et>,
        snapshot: ScheduleSnapshot<Et>,
        upcoming: Vec<DateTime<Et>>,
    ) -> Self {
        let mode = if snapshot.is_hiatus_week {
            BroadcastMode::Hiatus
        } else if snapshot.is_live_now {
            BroadcastMode::Live
        } else {
            BroadcastMode::Rerun
        };
        WebSchedule {
            now: now.fixed_offset(),
            current_occurrence: snapshot.current_occurrence.fixed_offset(),
            next_occurrence: snapshot.next_occurrence.fixed_offset(),
            is_live_now: snapshot.is_live_now,
            is_hiatus_week: snapshot.is_hiatus_week,
            time_until_next: snapshot.time_until_next,
            mode,
            upcoming: upcoming
                .into_iter()
                .map(|occurrence| occurrence.fixed_offset())
                .collect(),
        }
    }
}
