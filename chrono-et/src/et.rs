use std::fmt;

use chrono::DateTime;
use chrono::Datelike;
use chrono::FixedOffset;
use chrono::LocalResult;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Offset;
use chrono::TimeZone;
use chrono::Timelike;
use chrono::Utc;
use chrono::Weekday;

// US Eastern Time with the DST rules in force since 2007: UTC-5 (EST)
// outside DST, UTC-4 (EDT) from 02:00 local on the second Sunday of March
// until 02:00 local on the first Sunday of November.
//
// The implementation is based on chrono::offset::Utc and the examples in
// chrono::offset::TimeZone.

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Et;

impl Et {
    pub fn now() -> DateTime<Et> {
        Utc::now().with_timezone(&Et)
    }

    pub fn today() -> NaiveDate {
        Et::now().date_naive()
    }

    pub fn midnight() -> DateTime<Et> {
        Et::today()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(Et)
            .unwrap()
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct EtOffset {
    dst: bool,
}

impl EtOffset {
    pub fn is_dst(&self) -> bool {
        self.dst
    }
}

const EST: EtOffset = EtOffset { dst: false };
const EDT: EtOffset = EtOffset { dst: true };

// DST starts at 02:00 EST (07:00 UTC) and ends at 02:00 EDT (06:00 UTC).
fn dst_start_utc(year: i32) -> NaiveDateTime {
    nth_sunday(year, 3, 2).and_hms_opt(7, 0, 0).unwrap()
}

fn dst_end_utc(year: i32) -> NaiveDateTime {
    nth_sunday(year, 11, 1).and_hms_opt(6, 0, 0).unwrap()
}

fn nth_sunday(year: i32, month: u32, n: u8) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, n).unwrap()
}

fn offset_at_utc(utc: &NaiveDateTime) -> EtOffset {
    let year = utc.year();
    if *utc >= dst_start_utc(year) && *utc < dst_end_utc(year) {
        EDT
    } else {
        EST
    }
}

impl TimeZone for Et {
    type Offset = EtOffset;

    fn from_offset(_offset: &EtOffset) -> Et {
        Et
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<EtOffset> {
        // Noon is never inside the transition hours.
        self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<EtOffset> {
        let year = local.date().year();
        let dst_start = nth_sunday(year, 3, 2);
        let dst_end = nth_sunday(year, 11, 1);
        if local.date() == dst_start && local.hour() == 2 {
            // Spring forward, 02:00-02:59 doesn't exist.
            return LocalResult::None;
        }
        if local.date() == dst_end && local.hour() == 1 {
            // Fall back, 01:00-01:59 occurs twice.  The earlier one is EDT.
            return LocalResult::Ambiguous(EDT, EST);
        }
        let start_local = dst_start.and_hms_opt(2, 0, 0).unwrap();
        let end_local = dst_end.and_hms_opt(2, 0, 0).unwrap();
        if *local >= start_local && *local < end_local {
            LocalResult::Single(EDT)
        } else {
            LocalResult::Single(EST)
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> EtOffset {
        offset_at_utc(&utc.and_hms_opt(12, 0, 0).unwrap())
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> EtOffset {
        offset_at_utc(utc)
    }
}

impl Offset for EtOffset {
    fn fix(&self) -> FixedOffset {
        let secs = if self.dst { -4 * 60 * 60 } else { -5 * 60 * 60 };
        FixedOffset::east_opt(secs).unwrap()
    }
}

impl fmt::Display for EtOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.fix(), f) // Simply delegate to FixedOffset
    }
}

impl fmt::Debug for EtOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.fix(), f) // Simply delegate to FixedOffset
    }
}

impl fmt::Display for Et {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt("America/New_York", f)
    }
}

impl fmt::Debug for Et {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt("America/New_York", f)
    }
}

// </coverage:exclude>
