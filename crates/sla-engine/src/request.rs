//! Input validation and canonicalization for SLA calculations.
//!
//! Raw per-call input arrives as [`SlaParams`] — a bag of optional fields the
//! way callers naturally supply them. [`normalize`] validates the bag and
//! produces an [`SlaRequest`]: timezone parsed, start instant attached to the
//! zone, exactly one duration unit collapsed into a single [`chrono::Duration`],
//! excluded dates parsed into a set.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::availability::resolve_local;
use crate::error::SlaError;
use crate::holidays::HolidayRegion;

// ── Duration ────────────────────────────────────────────────────────────────

/// The SLA duration, in exactly one unit.
///
/// Modeling the three mutually exclusive `sla_hours` / `sla_days` /
/// `sla_weeks` fields as a single variant type removes the
/// multiple-units-set error class from everything downstream of
/// [`normalize`]. Hours remain the unit of account: days and weeks are
/// converted on the way in, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaDuration {
    Hours(u32),
    Days(u32),
    Weeks(u32),
}

impl SlaDuration {
    /// Total duration as a `chrono::Duration`.
    pub fn as_duration(&self) -> Duration {
        match *self {
            SlaDuration::Hours(n) => Duration::hours(i64::from(n)),
            SlaDuration::Days(n) => Duration::hours(i64::from(n) * 24),
            SlaDuration::Weeks(n) => Duration::hours(i64::from(n) * 24 * 7),
        }
    }

    fn value(&self) -> u32 {
        match *self {
            SlaDuration::Hours(n) | SlaDuration::Days(n) | SlaDuration::Weeks(n) => n,
        }
    }
}

// ── Start time ──────────────────────────────────────────────────────────────

/// The start of the SLA window: either an already-resolved instant or a
/// datetime string to be parsed in the request's timezone.
#[derive(Debug, Clone)]
pub enum StartTime {
    Instant(DateTime<Utc>),
    Literal(String),
}

impl Default for StartTime {
    fn default() -> Self {
        StartTime::Literal(String::new())
    }
}

impl From<DateTime<Utc>> for StartTime {
    fn from(dt: DateTime<Utc>) -> Self {
        StartTime::Instant(dt)
    }
}

impl From<&str> for StartTime {
    fn from(s: &str) -> Self {
        StartTime::Literal(s.to_string())
    }
}

impl From<String> for StartTime {
    fn from(s: String) -> Self {
        StartTime::Literal(s)
    }
}

// ── Raw parameters ──────────────────────────────────────────────────────────

/// Raw per-call input for an SLA calculation.
///
/// Exactly one of `sla_hours` / `sla_days` / `sla_weeks` must be set, and
/// must be positive. `excluded_dates` entries are `YYYY-MM-DD` strings.
/// `holiday_state` / `holiday_province` are meaningless without
/// `holiday_country`.
///
/// `skip_business_hours` defaults to **true**: the raw duration is added to
/// the start instant and the business-hour, weekend, holiday, and
/// excluded-date rules are all ignored.
#[derive(Debug, Clone)]
pub struct SlaParams {
    pub start_time: StartTime,
    /// Opening hour of the business day (24h clock).
    pub open_hour: u32,
    /// Closing hour of the business day (24h clock; 24 = end-of-day midnight).
    pub close_hour: u32,
    /// IANA timezone name the calculation runs in (e.g., `"America/Chicago"`).
    pub time_zone: String,
    pub skip_business_hours: bool,
    pub sla_hours: Option<u32>,
    pub sla_days: Option<u32>,
    pub sla_weeks: Option<u32>,
    pub excluded_dates: Vec<String>,
    /// ISO 3166 two-letter country code for holiday exclusion.
    pub holiday_country: Option<String>,
    pub holiday_state: Option<String>,
    pub holiday_province: Option<String>,
}

impl Default for SlaParams {
    fn default() -> Self {
        SlaParams {
            start_time: StartTime::default(),
            open_hour: 9,
            close_hour: 17,
            time_zone: "UTC".to_string(),
            skip_business_hours: true,
            sla_hours: None,
            sla_days: None,
            sla_weeks: None,
            excluded_dates: Vec::new(),
            holiday_country: None,
            holiday_state: None,
            holiday_province: None,
        }
    }
}

// ── Normalized request ──────────────────────────────────────────────────────

/// A validated, canonical SLA request. Produced by [`normalize`]; everything
/// downstream can rely on its invariants without re-checking.
#[derive(Debug, Clone)]
pub struct SlaRequest {
    /// Start instant, attached to the target timezone.
    pub start_time: DateTime<Tz>,
    pub open_hour: u32,
    pub close_hour: u32,
    pub tz: Tz,
    pub skip_business_hours: bool,
    /// The single supplied duration unit.
    pub duration: SlaDuration,
    /// Explicitly excluded calendar dates.
    pub excluded_dates: BTreeSet<NaiveDate>,
    /// Holiday lookup key, when holiday exclusion was requested.
    pub holiday_region: Option<HolidayRegion>,
}

/// Validate raw parameters and produce a canonical [`SlaRequest`].
///
/// # Errors
///
/// - [`SlaError::Validation`] — zero or multiple duration units supplied, or
///   a zero duration value.
/// - [`SlaError::Configuration`] — `open_hour >= close_hour` or
///   `close_hour > 24` in business-hour mode, or a state/province supplied
///   without a country.
/// - [`SlaError::InvalidTimezone`] — `time_zone` is not a valid IANA name.
/// - [`SlaError::Parse`] — unparseable start time or excluded-date string.
pub fn normalize(params: &SlaParams) -> Result<SlaRequest, SlaError> {
    let duration = normalize_duration(params)?;

    let tz: Tz = params
        .time_zone
        .parse()
        .map_err(|_| SlaError::InvalidTimezone(format!("'{}'", params.time_zone)))?;

    // Hour bounds only matter when business hours are enforced; in raw mode
    // they are unused and deliberately not cross-checked.
    if !params.skip_business_hours {
        if params.close_hour > 24 {
            return Err(SlaError::Configuration(format!(
                "close_hour must be at most 24, got {}",
                params.close_hour
            )));
        }
        if params.open_hour >= params.close_hour {
            return Err(SlaError::Configuration(format!(
                "open_hour ({}) must be before close_hour ({})",
                params.open_hour, params.close_hour
            )));
        }
    }

    let holiday_region = normalize_region(params)?;

    let mut excluded_dates = BTreeSet::new();
    for raw in &params.excluded_dates {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            SlaError::Parse(format!("excluded date '{raw}' is not in YYYY-MM-DD format"))
        })?;
        excluded_dates.insert(date);
    }

    let start_time = match &params.start_time {
        StartTime::Instant(dt) => dt.with_timezone(&tz),
        StartTime::Literal(s) => parse_start_literal(s, tz)?,
    };

    Ok(SlaRequest {
        start_time,
        open_hour: params.open_hour,
        close_hour: params.close_hour,
        tz,
        skip_business_hours: params.skip_business_hours,
        duration,
        excluded_dates,
        holiday_region,
    })
}

/// Collapse the three optional unit fields into a single [`SlaDuration`].
fn normalize_duration(params: &SlaParams) -> Result<SlaDuration, SlaError> {
    let mut supplied = Vec::new();
    if let Some(n) = params.sla_hours {
        supplied.push(SlaDuration::Hours(n));
    }
    if let Some(n) = params.sla_days {
        supplied.push(SlaDuration::Days(n));
    }
    if let Some(n) = params.sla_weeks {
        supplied.push(SlaDuration::Weeks(n));
    }

    match supplied.len() {
        0 => Err(SlaError::Validation(
            "provide one of sla_hours, sla_days, or sla_weeks".to_string(),
        )),
        1 => {
            let duration = supplied[0];
            if duration.value() == 0 {
                return Err(SlaError::Validation(
                    "SLA duration must be positive".to_string(),
                ));
            }
            Ok(duration)
        }
        _ => Err(SlaError::Validation(
            "provide only one of sla_hours, sla_days, or sla_weeks".to_string(),
        )),
    }
}

/// Build the holiday lookup key, rejecting a state/province without a country.
fn normalize_region(params: &SlaParams) -> Result<Option<HolidayRegion>, SlaError> {
    match &params.holiday_country {
        Some(country) => Ok(Some(HolidayRegion {
            country: country.clone(),
            state: params.holiday_state.clone(),
            province: params.holiday_province.clone(),
        })),
        None => {
            if params.holiday_state.is_some() || params.holiday_province.is_some() {
                return Err(SlaError::Configuration(
                    "holiday_state/holiday_province require holiday_country".to_string(),
                ));
            }
            Ok(None)
        }
    }
}

/// Parse a start-time string in the target timezone.
///
/// Accepts RFC 3339 (offset respected, then converted to the target zone) or
/// a naive local datetime / date: `%Y-%m-%dT%H:%M:%S`, `%Y-%m-%d %H:%M:%S`,
/// `%Y-%m-%d %H:%M`, `%Y-%m-%d` (midnight).
fn parse_start_literal(s: &str, tz: Tz) -> Result<DateTime<Tz>, SlaError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&tz));
    }

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return resolve_local(naive, tz);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return resolve_local(naive, tz);
        }
    }

    Err(SlaError::Parse(format!(
        "cannot parse start time '{s}'"
    )))
}

// ── Tests ───────────────────────────────────────────────────────────────────
