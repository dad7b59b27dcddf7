use chrono::DateTime;
use chrono::Datelike;
use chrono::Duration;
use chrono::LocalResult;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Weekday;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::Error;

/// The weekly cadence of the broadcast: a weekday, a start time and how long
/// the live window lasts once it opens.
///
/// Validated on construction.  All query functions in this module are total
/// for any value that construction accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecurrenceRule {
    weekday: Weekday,
    hour: u32,
    minute: u32,
    duration: Duration,
}

impl RecurrenceRule {
    /// `weekday` uses the Sunday-origin numbering (0 = Sunday .. 6 = Saturday)
    /// that the listing sources use.
    pub fn new(weekday: u8, hour: u8, minute: u8, duration_minutes: i64) -> Result<Self, Error> {
        let weekday = match weekday {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            _ => return Err(Error::InvalidRule("weekday must be in 0..=6")),
        };
        if hour > 23 {
            return Err(Error::InvalidRule("hour must be in 0..=23"));
        }
        if minute > 59 {
            return Err(Error::InvalidRule("minute must be in 0..=59"));
        }
        if duration_minutes <= 0 {
            return Err(Error::InvalidRule("duration must be positive"));
        }
        let duration = Duration::try_minutes(duration_minutes)
            .ok_or(Error::InvalidRule("duration out of range"))?;
        Ok(RecurrenceRule {
            weekday,
            hour: hour.into(),
            minute: minute.into(),
            duration,
        })
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// A recurring calendar-date range during which no occurrence airs.
///
/// Half-open: the start date is inside the window, the end date is not.
/// A window whose start is later in the year than its end wraps across the
/// year boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HiatusWindow {
    start: (u32, u32),
    end: (u32, u32),
}

impl HiatusWindow {
    pub fn new(start_month: u8, start_day: u8, end_month: u8, end_day: u8) -> Result<Self, Error> {
        for (month, day) in [(start_month, start_day), (end_month, end_day)] {
            if !(1..=12).contains(&month) {
                return Err(Error::InvalidRule("hiatus month must be in 1..=12"));
            }
            // Validated against a leap year, so (2, 29) is accepted.
            if NaiveDate::from_ymd_opt(2024, month.into(), day.into()).is_none() {
                return Err(Error::InvalidRule("hiatus day does not exist in that month"));
            }
        }
        let start = (start_month.into(), start_day.into());
        let end = (end_month.into(), end_day.into());
        if start == end {
            return Err(Error::InvalidRule("hiatus window must not be empty"));
        }
        Ok(HiatusWindow { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let d = (date.month(), date.day());
        if self.start <= self.end {
            self.start <= d && d < self.end
        } else {
            d >= self.start || d < self.end
        }
    }

    /// True if the two windows cover at least one (month, day) in common.
    pub fn overlaps(&self, other: &HiatusWindow) -> bool {
        // Half-open ranges on the calendar circle intersect iff either one
        // contains the other's start.  Construction validated both starts
        // against the 2024 leap year, so the dates exist.
        let date = |(m, d): (u32, u32)| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        self.contains(date(other.start)) || other.contains(date(self.start))
    }
}

/// Time left until the next occurrence, floored at every level and floored
/// at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    pub fn from_duration(duration: Duration) -> Self {
        if duration <= Duration::zero() {
            return Default::default();
        }
        TimeRemaining {
            days: duration.num_days(),
            hours: duration.num_hours() % 24,
            minutes: duration.num_minutes() % 60,
            seconds: duration.num_seconds() % 60,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Default::default()
    }
}

/// Everything the calculator knows about a single query instant.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleSnapshot<Tz: TimeZone> {
    pub current_occurrence: DateTime<Tz>,
    pub next_occurrence: DateTime<Tz>,
    pub is_live_now: bool,
    pub is_hiatus_week: bool,
    pub time_until_next: TimeRemaining,
}

/// Pure recurring-event arithmetic over a weekly rule and a set of hiatus
/// windows.
///
/// Constructed once from configuration and never mutated.  Every method is a
/// deterministic function of the explicit `now` argument; the wall clock is
/// never read internally.
#[derive(Clone, Debug)]
pub struct Scheduler {
    rule: RecurrenceRule,
    hiatus: Vec<HiatusWindow>,
}

impl Scheduler {
    pub fn new(rule: RecurrenceRule, hiatus: Vec<HiatusWindow>) -> Self {
        Scheduler { rule, hiatus }
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    /// The next occurrence start strictly after `now`.
    ///
    /// An occurrence starting at the exact query instant counts as *current*,
    /// not *next*.
    pub fn next_occurrence<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let target = self.rule.weekday.num_days_from_sunday() as i64;
        let today = now.weekday().num_days_from_sunday() as i64;
        let days_until = (target - today + 7) % 7;
        let mut date = now.date_naive() + Duration::days(days_until);
        let mut candidate = self.occurrence_on(date, &now.timezone());
        // Today is the target weekday but the start time has passed, or the
        // candidate landed on the boundary.
        while candidate <= *now {
            date += Duration::days(7);
            candidate = self.occurrence_on(date, &now.timezone());
        }
        candidate
    }

    /// The most recent occurrence start at or before `now`: exactly 7
    /// calendar days before [`Self::next_occurrence`], which is also the
    /// in-progress start time whenever `now` lies inside a live window.
    pub fn current_occurrence<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let next = self.next_occurrence(now);
        // Calendar arithmetic, not `next - 7*24h`: a DST transition inside
        // the week must not shift the wall-clock start time.
        let date = next.date_naive() - Duration::days(7);
        self.occurrence_on(date, &now.timezone())
    }

    /// True iff `now` lies in `[current, current + duration)`.
    ///
    /// The window is compared in absolute time, so a duration spanning
    /// midnight into the next calendar day needs no special casing.
    pub fn is_live_now<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let current = self.current_occurrence(now);
        let end = current.clone() + self.rule.duration;
        *now >= current && *now < end
    }

    /// True iff the (month, day) of `date` falls in any hiatus window.
    pub fn is_hiatus_week(&self, date: NaiveDate) -> bool {
        self.hiatus.iter().any(|window| window.contains(date))
    }

    pub fn time_until_next<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TimeRemaining {
        TimeRemaining::from_duration(self.next_occurrence(now) - now.clone())
    }

    pub fn snapshot<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ScheduleSnapshot<Tz> {
        let next = self.next_occurrence(now);
        let current = self.occurrence_on(next.date_naive() - Duration::days(7), &now.timezone());
        let is_live_now = *now < current.clone() + self.rule.duration;
        ScheduleSnapshot {
            is_live_now,
            is_hiatus_week: self.is_hiatus_week(current.date_naive()),
            time_until_next: TimeRemaining::from_duration(next.clone() - now.clone()),
            current_occurrence: current,
            next_occurrence: next,
        }
    }

    /// The next `count` occurrence starts that don't fall in a hiatus week,
    /// scanning forward week by week from `now`.
    pub fn upcoming<Tz: TimeZone>(&self, now: &DateTime<Tz>, count: usize) -> Vec<DateTime<Tz>> {
        let mut occurrences = Vec::with_capacity(count);
        let mut date = self.next_occurrence(now).date_naive();
        // No hiatus window spans a full year, so one extra year of Saturdays
        // is enough even when every requested occurrence hits a window.
        let mut weeks_left = count + 53;
        while occurrences.len() < count && weeks_left > 0 {
            if !self.is_hiatus_week(date) {
                occurrences.push(self.occurrence_on(date, &now.timezone()));
            }
            date += Duration::days(7);
            weeks_left -= 1;
        }
        occurrences
    }

    fn occurrence_on<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
        let local = date
            .and_hms_opt(self.rule.hour, self.rule.minute, 0)
            .unwrap();
        resolve_local(local, tz)
    }
}

fn resolve_local<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        // The repeated hour at a backward transition, take the earlier one.
        LocalResult::Ambiguous(earliest, _) => earliest,
        // The skipped hour at a forward transition, shift into the next one.
        LocalResult::None => match tz.from_local_datetime(&(local + Duration::hours(1))) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => unreachable!(),
        },
    }
}

// <coverage:exclude>
#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use chrono::Timelike;
    use chrono::Utc;
    use chrono_et::Et;

    // Saturday 23:30, 90 minutes.  2024-11-16 is a Saturday.
    fn rule() -> RecurrenceRule {
        RecurrenceRule::new(6, 23, 30, 90).unwrap()
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(rule(), vec![])
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_invalid_rules() {
        assert_matches!(RecurrenceRule::new(7, 23, 30, 90), Err(Error::InvalidRule(_)));
        assert_matches!(RecurrenceRule::new(6, 24, 30, 90), Err(Error::InvalidRule(_)));
        assert_matches!(RecurrenceRule::new(6, 23, 60, 90), Err(Error::InvalidRule(_)));
        assert_matches!(RecurrenceRule::new(6, 23, 30, 0), Err(Error::InvalidRule(_)));
        assert_matches!(RecurrenceRule::new(6, 23, 30, -5), Err(Error::InvalidRule(_)));
        assert_matches!(RecurrenceRule::new(6, 23, 30, 90), Ok(_));
    }

    #[test]
    fn test_invalid_hiatus_window() {
        assert_matches!(HiatusWindow::new(13, 1, 9, 1), Err(Error::InvalidRule(_)));
        assert_matches!(HiatusWindow::new(5, 0, 9, 1), Err(Error::InvalidRule(_)));
        assert_matches!(HiatusWindow::new(5, 1, 5, 1), Err(Error::InvalidRule(_)));
        assert_matches!(HiatusWindow::new(5, 1, 9, 1), Ok(_));
    }

    #[test]
    fn test_hiatus_day_must_exist_in_month() {
        assert_matches!(HiatusWindow::new(2, 30, 9, 1), Err(Error::InvalidRule(_)));
        assert_matches!(HiatusWindow::new(6, 31, 9, 1), Err(Error::InvalidRule(_)));
        assert_matches!(HiatusWindow::new(5, 1, 4, 31), Err(Error::InvalidRule(_)));
        // Leap day is a valid boundary.
        assert_matches!(HiatusWindow::new(2, 29, 9, 1), Ok(_));
    }

    #[test]
    fn test_next_occurrence_saturday_evening() {
        // Saturday 22:00, before the show.
        let now = utc(2024, 11, 16, 22, 0, 0);
        let next = scheduler().next_occurrence(&now);
        assert_eq!(next, utc(2024, 11, 16, 23, 30, 0));
        assert!(!scheduler().is_live_now(&now));
        assert_eq!(
            scheduler().time_until_next(&now),
            TimeRemaining {
                days: 0,
                hours: 1,
                minutes: 30,
                seconds: 0
            }
        );
    }

    #[test]
    fn test_next_occurrence_is_strictly_future() {
        // Saturday 23:45, the show has started.
        let now = utc(2024, 11, 16, 23, 45, 0);
        assert_eq!(scheduler().next_occurrence(&now), utc(2024, 11, 23, 23, 30, 0));

        // Exactly at the start the occurrence counts as current, not next.
        let now = utc(2024, 11, 16, 23, 30, 0);
        assert_eq!(scheduler().next_occurrence(&now), utc(2024, 11, 23, 23, 30, 0));
        assert_eq!(scheduler().current_occurrence(&now), now);
        assert!(scheduler().is_live_now(&now));
    }

    #[test]
    fn test_next_occurrence_midweek() {
        // Tuesday 23:30, exactly 4 days before the show.
        let now = utc(2024, 11, 12, 23, 30, 0);
        let next = scheduler().next_occurrence(&now);
        assert_eq!(next, utc(2024, 11, 16, 23, 30, 0));
        assert_eq!(next - now, Duration::days(4));
    }

    #[test]
    fn test_current_occurrence_in_progress() {
        // Sunday 00:45, inside the live window that opened Saturday night.
        let now = utc(2024, 11, 17, 0, 45, 0);
        let scheduler = scheduler();
        assert_eq!(scheduler.current_occurrence(&now), utc(2024, 11, 16, 23, 30, 0));
        assert!(scheduler.is_live_now(&now));
        assert_eq!(scheduler.next_occurrence(&now), utc(2024, 11, 23, 23, 30, 0));
    }

    #[test]
    fn test_weekly_delta() {
        let scheduler = scheduler();
        for now in [
            utc(2024, 11, 12, 23, 30, 0),
            utc(2024, 11, 16, 22, 0, 0),
            utc(2024, 11, 17, 12, 0, 0),
        ] {
            assert!(!scheduler.is_live_now(&now));
            let delta = scheduler.next_occurrence(&now) - scheduler.current_occurrence(&now);
            assert_eq!(delta, Duration::days(7));
        }
    }

    #[test]
    fn test_live_window_crosses_midnight() {
        let scheduler = scheduler();
        assert!(scheduler.is_live_now(&utc(2024, 11, 16, 23, 45, 0)));
        assert!(scheduler.is_live_now(&utc(2024, 11, 17, 0, 15, 0)));
        assert!(!scheduler.is_live_now(&utc(2024, 11, 17, 1, 5, 0)));
        assert!(!scheduler.is_live_now(&utc(2024, 11, 16, 23, 15, 0)));
        // The window is half-open, 01:00 is already out.
        assert!(!scheduler.is_live_now(&utc(2024, 11, 17, 1, 0, 0)));
        assert!(scheduler.is_live_now(&utc(2024, 11, 17, 0, 59, 59)));
    }

    #[test]
    fn test_idempotence() {
        let now = utc(2024, 11, 16, 22, 0, 0);
        let scheduler = scheduler();
        assert_eq!(scheduler.next_occurrence(&now), scheduler.next_occurrence(&now));
        assert_eq!(scheduler.snapshot(&now), scheduler.snapshot(&now));
    }

    #[test]
    fn test_hiatus_half_open_boundaries() {
        let window = HiatusWindow::new(5, 1, 9, 1).unwrap();
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()));
    }

    #[test]
    fn test_hiatus_wraps_year_boundary() {
        let window = HiatusWindow::new(12, 16, 1, 15).unwrap();
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 12, 16).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 12, 15).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
    }

    #[test]
    fn test_hiatus_overlap() {
        let summer = HiatusWindow::new(6, 1, 10, 1).unwrap();
        let holiday = HiatusWindow::new(12, 16, 1, 15).unwrap();
        assert!(!summer.overlaps(&holiday));
        let july = HiatusWindow::new(7, 1, 8, 1).unwrap();
        assert!(summer.overlaps(&july));
        assert!(july.overlaps(&summer));
        let new_year = HiatusWindow::new(1, 1, 2, 1).unwrap();
        assert!(holiday.overlaps(&new_year));
    }

    #[test]
    fn test_snapshot_hiatus_week() {
        let scheduler = Scheduler::new(rule(), vec![HiatusWindow::new(6, 1, 10, 1).unwrap()]);
        // 2024-07-06 is a Saturday inside the summer window.
        let now = utc(2024, 7, 2, 12, 0, 0);
        let snapshot = scheduler.snapshot(&now);
        assert_eq!(snapshot.next_occurrence, utc(2024, 7, 6, 23, 30, 0));
        assert!(!snapshot.is_live_now);
        // The hiatus flag is evaluated against the current occurrence's date.
        assert!(scheduler.is_hiatus_week(snapshot.current_occurrence.date_naive()));
        assert!(snapshot.is_hiatus_week);
    }

    #[test]
    fn test_upcoming_skips_hiatus_weeks() {
        let scheduler = Scheduler::new(rule(), vec![HiatusWindow::new(6, 1, 10, 1).unwrap()]);
        // Monday 2024-05-20.  The summer window swallows every Saturday from
        // June through September.
        let now = utc(2024, 5, 20, 12, 0, 0);
        let upcoming = scheduler.upcoming(&now, 3);
        assert_eq!(
            upcoming,
            vec![
                utc(2024, 5, 25, 23, 30, 0),
                utc(2024, 10, 5, 23, 30, 0),
                utc(2024, 10, 12, 23, 30, 0),
            ]
        );
    }

    #[test]
    fn test_time_remaining_zero_floored() {
        assert!(TimeRemaining::from_duration(Duration::seconds(-5)).is_zero());
        assert!(TimeRemaining::from_duration(Duration::zero()).is_zero());
        assert_eq!(
            TimeRemaining::from_duration(Duration::days(2) + Duration::seconds(61)),
            TimeRemaining {
                days: 2,
                hours: 0,
                minutes: 1,
                seconds: 1
            }
        );
    }

    #[test]
    fn test_wall_clock_time_stable_across_dst() {
        let scheduler = scheduler();
        // DST starts 2025-03-09.  The Saturday before airs at 23:30 EST, the
        // Saturday after at 23:30 EDT.
        let now = Et.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        let next = scheduler.next_occurrence(&now);
        let current = scheduler.current_occurrence(&now);
        assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!((next.hour(), next.minute()), (23, 30));
        assert_eq!(current.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
        assert_eq!((current.hour(), current.minute()), (23, 30));
        // The absolute gap shrinks by the skipped hour.
        assert_eq!(next - current, Duration::days(7) - Duration::hours(1));
    }

    #[test]
    fn test_live_window_across_spring_forward() {
        // 2025-03-08 23:30 EST plus 90 minutes ends at 01:00 EST, one hour
        // before the clocks jump.
        let scheduler = scheduler();
        let live = Et.with_ymd_and_hms(2025, 3, 9, 0, 30, 0).unwrap();
        assert!(scheduler.is_live_now(&live));
        let over = Et.with_ymd_and_hms(2025, 3, 9, 1, 30, 0).unwrap();
        assert!(!scheduler.is_live_now(&over));
    }
}
// </coverage:exclude>
