//! Per-day availability for business-hour SLA advancement.
//!
//! Answers two questions about a calendar date in the target timezone: is the
//! whole day excluded (weekend, holiday, explicitly listed), and if not, at
//! which instants does it open and close. Weekends are excluded structurally
//! whenever business-hour mode is active — they never appear in the resolved
//! date set and cannot be re-enabled by a holiday calendar.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Weekday};
use chrono_tz::Tz;

use crate::error::SlaError;
use crate::holidays::HolidayLookup;
use crate::request::SlaRequest;

// ── Local-instant resolution ────────────────────────────────────────────────

/// Attach a naive local datetime to a timezone.
///
/// A wall-clock time erased by a spring-forward transition resolves to the
/// next representable instant; an ambiguous fall-back time takes the earlier
/// offset.
pub(crate) fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>, SlaError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => {
            // Inside a DST gap; no local time is more than an hour away from
            // a representable one.
            tz.from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .ok_or_else(|| {
                    SlaError::Parse(format!("local time {naive} does not exist in {tz}"))
                })
        }
    }
}

// ── Day window ──────────────────────────────────────────────────────────────

/// The open and close instants of one business day in the target timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub open: DateTime<Tz>,
    pub close: DateTime<Tz>,
}

/// The business window for `date`: local instants at `open_hour`:00 and
/// `close_hour`:00. A close hour of 24 is midnight at the start of the next
/// day.
///
/// # Errors
///
/// Returns [`SlaError::Parse`] only for dates at the edge of the supported
/// calendar range.
pub fn day_window(
    date: NaiveDate,
    open_hour: u32,
    close_hour: u32,
    tz: Tz,
) -> Result<DayWindow, SlaError> {
    let open_naive = date
        .and_hms_opt(open_hour, 0, 0)
        .ok_or_else(|| SlaError::Parse(format!("invalid open hour {open_hour} on {date}")))?;

    let close_naive = if close_hour == 24 {
        let next = date
            .succ_opt()
            .ok_or_else(|| SlaError::Parse(format!("date {date} out of calendar range")))?;
        next.and_hms_opt(0, 0, 0)
            .ok_or_else(|| SlaError::Parse(format!("date {date} out of calendar range")))?
    } else {
        date.and_hms_opt(close_hour, 0, 0)
            .ok_or_else(|| SlaError::Parse(format!("invalid close hour {close_hour} on {date}")))?
    };

    Ok(DayWindow {
        open: resolve_local(open_naive, tz)?,
        close: resolve_local(close_naive, tz)?,
    })
}

// ── Resolved exclusions ─────────────────────────────────────────────────────

/// The union of explicitly excluded dates and holiday dates for the span one
/// calculation can touch. Immutable once resolved; weekends are checked
/// structurally rather than materialized.
#[derive(Debug, Clone)]
pub struct ResolvedExclusions {
    dates: BTreeSet<NaiveDate>,
}

impl ResolvedExclusions {
    /// Resolve the exclusion set for a request.
    ///
    /// Holiday years are loaded for every year the advancement loop can
    /// reach: the duration spread over the per-day availability, doubled for
    /// weekends, plus a year of slack for holidays and partial days.
    ///
    /// # Errors
    ///
    /// Propagates [`SlaError::HolidayLookup`] from the holiday collaborator
    /// unchanged.
    pub fn resolve(
        request: &SlaRequest,
        lookup: &dyn HolidayLookup,
    ) -> Result<Self, SlaError> {
        let mut dates = request.excluded_dates.clone();

        if let Some(region) = &request.holiday_region {
            let hours_per_day =
                (i64::from(request.close_hour) - i64::from(request.open_hour)).max(1);
            let total_hours = request.duration.as_duration().num_hours().max(1);
            let working_days = (total_hours + hours_per_day - 1) / hours_per_day;
            // Clamped to a century so a pathological duration cannot push the
            // date arithmetic out of chrono's range.
            let span_days = (working_days * 2 + 366).min(36_600);

            let first_year = request.start_time.year();
            let last_year = (request.start_time.date_naive() + Duration::days(span_days)).year();
            for year in first_year..=last_year {
                dates.extend(lookup.holidays(region, year)?);
            }
        }

        Ok(ResolvedExclusions { dates })
    }

    /// An exclusion set with no holiday component, for tests and callers
    /// that only need explicit dates.
    pub fn from_dates(dates: BTreeSet<NaiveDate>) -> Self {
        ResolvedExclusions { dates }
    }

    /// Whether `date` contributes zero availability: Saturday/Sunday always,
    /// otherwise membership in the resolved set.
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || self.dates.contains(&date)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn chicago() -> Tz {
        "America/Chicago".parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── day_window ──────────────────────────────────────────────────────

    #[test]
    fn test_window_instants_in_zone() {
        let window = day_window(date(2023, 10, 18), 9, 17, chicago()).unwrap();
        assert_eq!(window.open.hour(), 9);
        assert_eq!(window.close.hour(), 17);
        // October 18 is CDT (UTC-5)
        assert_eq!(window.open.to_rfc3339(), "2023-10-18T09:00:00-05:00");
    }

    #[test]
    fn test_window_close_24_is_next_midnight() {
        let window = day_window(date(2023, 10, 18), 0, 24, chicago()).unwrap();
        assert_eq!(window.close.day(), 19);
        assert_eq!(window.close.hour(), 0);
        assert_eq!(window.close - window.open, Duration::hours(24));
    }

    #[test]
    fn test_window_spring_forward_gap_shifts_open() {
        // US spring forward 2024-03-10: 02:00 local does not exist.
        let window = day_window(date(2024, 3, 10), 2, 17, chicago()).unwrap();
        assert_eq!(window.open.hour(), 3);
        assert_eq!(window.close.hour(), 17);
    }

    #[test]
    fn test_window_fall_back_takes_earlier_offset() {
        // US fall back 2023-11-05: 01:00 local occurs twice; take CDT.
        let window = day_window(date(2023, 11, 5), 1, 17, chicago()).unwrap();
        assert_eq!(window.open.offset().to_string(), "CDT");
    }

    // ── exclusions ──────────────────────────────────────────────────────

    #[test]
    fn test_weekends_always_excluded() {
        let exclusions = ResolvedExclusions::from_dates(BTreeSet::new());
        assert!(exclusions.is_excluded(date(2023, 10, 21))); // Saturday
        assert!(exclusions.is_excluded(date(2023, 10, 22))); // Sunday
        assert!(!exclusions.is_excluded(date(2023, 10, 23))); // Monday
    }

    #[test]
    fn test_explicit_dates_excluded() {
        let mut dates = BTreeSet::new();
        dates.insert(date(2023, 10, 19));
        let exclusions = ResolvedExclusions::from_dates(dates);
        assert!(exclusions.is_excluded(date(2023, 10, 19)));
        assert!(!exclusions.is_excluded(date(2023, 10, 18)));
    }
}
