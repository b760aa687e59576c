// ── Activity windows ──
//
// Computes the `[start, end]` reporting window and cadence the insights
// and data-usage endpoints expect, from a period name and the network's
// IANA timezone. Pure apart from reading the clock in `window()`.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Reporting period of an activity series.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
}

/// Bucket size of the returned series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Cadence {
    Hourly,
    Daily,
}

/// A closed reporting window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub cadence: Cadence,
}

impl ActivityWindow {
    /// `start` as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn start_iso(&self) -> String {
        self.start.format(WIRE_FORMAT).to_string()
    }

    /// `end` as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn end_iso(&self) -> String {
        self.end.format(WIRE_FORMAT).to_string()
    }
}

/// Window for `period` as of now, in the named timezone.
pub fn window(period: Period, timezone: &str) -> ActivityWindow {
    window_at(period, parse_timezone(timezone), Utc::now())
}

/// Resolve an IANA timezone name, falling back to UTC.
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!(timezone = name, "unknown timezone, using UTC");
        Tz::UTC
    })
}

/// Window for `period` containing `now`, with boundaries at local midnight.
///
/// - day: today, hourly
/// - week: starts `weekday-from-Monday + 1` days back (the Sunday before
///   today, or the previous Sunday when today is Sunday), daily
/// - month: starts on the 1st, daily
///
/// `end` is one second before the next boundary.
pub fn window_at(period: Period, tz: Tz, now: DateTime<Utc>) -> ActivityWindow {
    let today = now.with_timezone(&tz).date_naive();

    let (first, next, cadence) = match period {
        Period::Day => (today, today + Days::new(1), Cadence::Hourly),
        Period::Week => {
            let back = u64::from(today.weekday().num_days_from_monday()) + 1;
            let first = today - Days::new(back);
            (first, first + Days::new(7), Cadence::Daily)
        }
        Period::Month => {
            let first = today - Days::new(u64::from(today.day0()));
            (first, first + Months::new(1), Cadence::Daily)
        }
    };

    ActivityWindow {
        start: local_midnight(tz, first),
        end: local_midnight(tz, next) - TimeDelta::seconds(1),
        cadence,
    }
}

/// First instant of `date` in `tz`. Ambiguous midnights take the earlier
/// instant; a midnight skipped by a DST jump moves to the hour after.
fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + TimeDelta::hours(1)))
                .earliest()
        })
        .map_or_else(
            || Utc.from_utc_datetime(&naive),
            |local| local.with_timezone(&Utc),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Timelike, Weekday};
    use chrono_tz::America::{Los_Angeles, Santiago};
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn day_window_in_local_time() {
        // Wednesday 2024-03-13 11:30 PDT
        let w = window_at(Period::Day, Los_Angeles, at(2024, 3, 13, 18, 30));
        assert_eq!(w.start_iso(), "2024-03-13T07:00:00Z");
        assert_eq!(w.end_iso(), "2024-03-14T06:59:59Z");
        assert_eq!(w.cadence, Cadence::Hourly);
    }

    #[test]
    fn day_uses_local_date_not_utc_date() {
        // 2024-03-14 03:00 UTC is still the 13th in Los Angeles
        let w = window_at(Period::Day, Los_Angeles, at(2024, 3, 14, 3, 0));
        assert_eq!(w.start_iso(), "2024-03-13T07:00:00Z");
    }

    #[test]
    fn week_window_spans_dst_change() {
        let w = window_at(Period::Week, Los_Angeles, at(2024, 3, 13, 18, 30));
        // Sunday 2024-03-10 00:00 PST
        assert_eq!(w.start_iso(), "2024-03-10T08:00:00Z");
        // Sunday 2024-03-17 00:00 PDT, minus one second
        assert_eq!(w.end_iso(), "2024-03-17T06:59:59Z");
        assert_eq!(w.cadence, Cadence::Daily);
    }

    #[test]
    fn week_on_sunday_starts_previous_sunday() {
        // Sunday 2024-03-17 05:00 PDT
        let w = window_at(Period::Week, Los_Angeles, at(2024, 3, 17, 12, 0));
        let start = w.start.with_timezone(&Los_Angeles);
        assert_eq!(start.weekday(), Weekday::Sun);
        assert_eq!(w.start_iso(), "2024-03-10T08:00:00Z");
    }

    #[test]
    fn month_window_handles_leap_february() {
        let w = window_at(Period::Month, Tz::UTC, at(2024, 2, 10, 9, 0));
        assert_eq!(w.start_iso(), "2024-02-01T00:00:00Z");
        assert_eq!(w.end_iso(), "2024-02-29T23:59:59Z");
        assert_eq!(w.cadence, Cadence::Daily);
    }

    #[test]
    fn month_window_across_dst() {
        let w = window_at(Period::Month, Los_Angeles, at(2024, 3, 13, 18, 30));
        assert_eq!(w.start_iso(), "2024-03-01T08:00:00Z");
        assert_eq!(w.end_iso(), "2024-04-01T06:59:59Z");
    }

    #[test]
    fn skipped_midnight_moves_forward() {
        // Chile sprang forward at 2022-09-11 00:00 local time.
        let w = window_at(Period::Day, Santiago, at(2022, 9, 11, 15, 0));
        assert!(w.start < w.end);
        let local = w.start.with_timezone(&Santiago);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2022, 9, 11).unwrap());
    }

    #[test]
    fn every_window_is_aligned_and_ordered() {
        let now = at(2024, 7, 4, 22, 15);
        for period in [Period::Day, Period::Week, Period::Month] {
            let w = window_at(period, Los_Angeles, now);
            assert!(w.start < w.end, "{period}: start must precede end");
            let local = w.start.with_timezone(&Los_Angeles);
            assert_eq!((local.hour(), local.minute(), local.second()), (0, 0, 0));
            assert_eq!(w.end.second(), 59);
            match period {
                Period::Day => assert_eq!(w.cadence, Cadence::Hourly),
                Period::Week => assert_eq!(local.weekday(), Weekday::Sun),
                Period::Month => assert_eq!(local.day(), 1),
            }
        }
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        assert_eq!(parse_timezone("Mars/Olympus_Mons"), Tz::UTC);
        assert_eq!(parse_timezone("America/Los_Angeles"), Los_Angeles);
    }
}
