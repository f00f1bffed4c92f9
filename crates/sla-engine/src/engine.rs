//! The SLA advancement loop and call-level entry points.
//!
//! [`calculate`] is the single entry point: normalize the raw parameters,
//! then either add the raw duration to the start instant (default) or walk
//! the duration forward through business-hour windows, consuming time only
//! against non-excluded days. The walk is bounded: every pass through a
//! working day consumes a positive amount of the remainder.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::Serialize;

use crate::availability::{day_window, DayWindow, ResolvedExclusions};
use crate::error::SlaError;
use crate::holidays::{BuiltinHolidays, HolidayLookup};
use crate::request::{normalize, SlaParams, SlaRequest};

/// Consecutive fully-excluded days tolerated before the walk gives up. Ten
/// years of calendar with no working day means the exclusion rules are
/// unsatisfiable, not that the SLA is long.
const MAX_EXCLUDED_SCAN: i64 = 3660;

// ── Result ──────────────────────────────────────────────────────────────────

/// The outcome of one SLA calculation. Immutable; the accessors are pure
/// projections of `sla_expiration_time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaResult {
    /// The start instant, attached to the target timezone.
    pub start_time: DateTime<Tz>,
    /// Open instant of the day the consumption started on. `None` when
    /// business hours were skipped.
    pub open_time: Option<DateTime<Tz>>,
    /// Close instant of the same day. `None` when business hours were
    /// skipped.
    pub close_time: Option<DateTime<Tz>>,
    /// The instant the SLA expires. Always at or after `start_time`.
    pub sla_expiration_time: DateTime<Tz>,
}

impl SlaResult {
    pub fn expiration_hour(&self) -> u32 {
        self.sla_expiration_time.hour()
    }

    pub fn expiration_minute(&self) -> u32 {
        self.sla_expiration_time.minute()
    }

    pub fn expiration_day(&self) -> u32 {
        self.sla_expiration_time.day()
    }

    pub fn expiration_date(&self) -> NaiveDate {
        self.sla_expiration_time.date_naive()
    }
}

impl fmt::Display for SlaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sla_expiration_time.to_rfc3339())
    }
}

// ── Entry points ────────────────────────────────────────────────────────────

/// Compute the SLA expiration for `params` using the built-in holiday
/// calendar.
///
/// # Errors
///
/// Any of the [`SlaError`] kinds; the calculation aborts entirely on the
/// first failure, there is no partial result.
///
/// # Examples
///
/// ```
/// use sla_engine::{calculate, SlaParams};
///
/// let params = SlaParams {
///     start_time: "2023-10-18 01:27".into(),
///     time_zone: "America/Chicago".to_string(),
///     skip_business_hours: false,
///     open_hour: 9,
///     close_hour: 17,
///     sla_hours: Some(6),
///     ..SlaParams::default()
/// };
/// let result = calculate(&params).unwrap();
/// // Start before opening snaps to 09:00; 6 of the 8 window hours land at 15:00.
/// assert_eq!(result.to_string(), "2023-10-18T15:00:00-05:00");
/// ```
pub fn calculate(params: &SlaParams) -> Result<SlaResult, SlaError> {
    calculate_with(params, &BuiltinHolidays)
}

/// Compute the SLA expiration with an injected holiday calendar.
///
/// The lookup is only consulted in business-hour mode and only when
/// `holiday_country` is set.
pub fn calculate_with(
    params: &SlaParams,
    lookup: &dyn HolidayLookup,
) -> Result<SlaResult, SlaError> {
    let request = normalize(params)?;

    if request.skip_business_hours {
        // Raw mode: instant arithmetic, no calendar-awareness. Weekends and
        // holidays count as elapsed time.
        return Ok(SlaResult {
            start_time: request.start_time,
            open_time: None,
            close_time: None,
            sla_expiration_time: request.start_time + request.duration.as_duration(),
        });
    }

    let exclusions = ResolvedExclusions::resolve(&request, lookup)?;
    advance(&request, &exclusions)
}

// ── Advancer ────────────────────────────────────────────────────────────────

/// Walk the duration forward through business-hour windows.
///
/// The cursor skips excluded days and closed hours without consuming time,
/// snaps a pre-open cursor to the same day's open, and consumes
/// `min(remaining, close - cursor)` per working day until the remainder fits
/// inside the current window.
///
/// The reported open/close pair is the window of the first non-excluded day
/// at or after the start — the day consumption begins — even when the
/// expiration lands on a later day. Callers depend on that exact shape.
fn advance(request: &SlaRequest, exclusions: &ResolvedExclusions) -> Result<SlaResult, SlaError> {
    let mut cursor = request.start_time;
    let mut remaining = request.duration.as_duration();
    let mut start_window: Option<DayWindow> = None;
    let mut excluded_scan = 0i64;

    loop {
        let date = cursor.date_naive();

        if exclusions.is_excluded(date) {
            excluded_scan += 1;
            if excluded_scan > MAX_EXCLUDED_SCAN {
                return Err(SlaError::Configuration(
                    "no working day within ten years of the start".to_string(),
                ));
            }
            cursor = next_day_open(date, request)?;
            continue;
        }

        let window = day_window(date, request.open_hour, request.close_hour, request.tz)?;

        if cursor < window.open {
            // Not yet open: snap forward within the same day.
            cursor = window.open;
        } else if cursor >= window.close {
            // At or past close: this day contributes nothing more.
            excluded_scan += 1;
            if excluded_scan > MAX_EXCLUDED_SCAN {
                return Err(SlaError::Configuration(
                    "no working day within ten years of the start".to_string(),
                ));
            }
            cursor = next_day_open(date, request)?;
            continue;
        }

        excluded_scan = 0;
        let reported = *start_window.get_or_insert(window);

        let available = window.close - cursor;
        if remaining <= available {
            return Ok(SlaResult {
                start_time: request.start_time,
                open_time: Some(reported.open),
                close_time: Some(reported.close),
                sla_expiration_time: cursor + remaining,
            });
        }

        remaining -= available;
        cursor = window.close;
    }
}

/// Open instant of the day after `date`.
fn next_day_open(date: NaiveDate, request: &SlaRequest) -> Result<DateTime<Tz>, SlaError> {
    let next = date
        .succ_opt()
        .ok_or_else(|| SlaError::Parse(format!("date {date} out of calendar range")))?;
    Ok(day_window(next, request.open_hour, request.close_hour, request.tz)?.open)
}

// ── Tests ───────────────────────────────────────────────────────────────────
