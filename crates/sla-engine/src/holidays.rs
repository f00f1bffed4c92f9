//! Holiday calendars for SLA date exclusion.
//!
//! Holiday resolution is an injected capability: the engine only sees the
//! [`HolidayLookup`] trait, so tests can substitute a fixed set of dates
//! without a real calendar. [`BuiltinHolidays`] is the default
//! implementation, covering the region codes the engine supports out of the
//! box. An unsupported country code is an error, never an empty answer —
//! silently treating every day as a working day would shorten SLAs.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::SlaError;

// ── Lookup key ──────────────────────────────────────────────────────────────

/// The key a holiday calendar is queried by: an ISO 3166 country code plus
/// an optional state or province subdivision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidayRegion {
    pub country: String,
    pub state: Option<String>,
    pub province: Option<String>,
}

// ── Capability trait ────────────────────────────────────────────────────────

/// A source of holiday dates, keyed by region and year.
pub trait HolidayLookup {
    /// The named holiday dates observed in `region` during `year`.
    ///
    /// # Errors
    ///
    /// Returns [`SlaError::HolidayLookup`] for a country, state, or province
    /// the calendar does not know.
    fn holidays(&self, region: &HolidayRegion, year: i32) -> Result<Vec<NaiveDate>, SlaError>;
}

// ── Built-in calendar ───────────────────────────────────────────────────────

/// The default holiday calendar.
///
/// Supported regions:
/// - `US` — federal holidays; state `TX` adds Texas Independence Day and
///   San Jacinto Day.
/// - `CA` — national holidays; province `QC` adds Saint-Jean-Baptiste Day.
///
/// Dates are the actual holiday dates, not weekend-observed shifts: in
/// business-hour mode weekends are already excluded, so a Saturday holiday
/// changes nothing either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinHolidays;

impl HolidayLookup for BuiltinHolidays {
    fn holidays(&self, region: &HolidayRegion, year: i32) -> Result<Vec<NaiveDate>, SlaError> {
        let country = region.country.to_ascii_uppercase();
        match country.as_str() {
            "US" => us_holidays(region, year),
            "CA" => canada_holidays(region, year),
            _ => Err(SlaError::HolidayLookup(format!(
                "unsupported country code '{}'",
                region.country
            ))),
        }
    }
}

fn us_holidays(region: &HolidayRegion, year: i32) -> Result<Vec<NaiveDate>, SlaError> {
    let mut dates = vec![
        // New Year's Day
        ymd(year, 1, 1)?,
        // Martin Luther King Jr. Day
        nth_weekday(year, 1, Weekday::Mon, 3)?,
        // Washington's Birthday
        nth_weekday(year, 2, Weekday::Mon, 3)?,
        // Memorial Day
        last_weekday(year, 5, Weekday::Mon)?,
        // Juneteenth
        ymd(year, 6, 19)?,
        // Independence Day
        ymd(year, 7, 4)?,
        // Labor Day
        nth_weekday(year, 9, Weekday::Mon, 1)?,
        // Columbus Day
        nth_weekday(year, 10, Weekday::Mon, 2)?,
        // Veterans Day
        ymd(year, 11, 11)?,
        // Thanksgiving
        nth_weekday(year, 11, Weekday::Thu, 4)?,
        // Christmas Day
        ymd(year, 12, 25)?,
    ];

    if let Some(state) = &region.state {
        match state.to_ascii_uppercase().as_str() {
            "TX" => {
                // Texas Independence Day, San Jacinto Day
                dates.push(ymd(year, 3, 2)?);
                dates.push(ymd(year, 4, 21)?);
            }
            _ => {
                return Err(SlaError::HolidayLookup(format!(
                    "unsupported US state '{state}'"
                )));
            }
        }
    }
    if let Some(province) = &region.province {
        return Err(SlaError::HolidayLookup(format!(
            "US holidays are keyed by state, not province '{province}'"
        )));
    }

    Ok(dates)
}

fn canada_holidays(region: &HolidayRegion, year: i32) -> Result<Vec<NaiveDate>, SlaError> {
    let easter = easter_sunday(year)?;
    let mut dates = vec![
        // New Year's Day
        ymd(year, 1, 1)?,
        // Good Friday
        easter - Duration::days(2),
        // Victoria Day: the Monday preceding May 25
        last_weekday_before(ymd(year, 5, 25)?, Weekday::Mon),
        // Canada Day
        ymd(year, 7, 1)?,
        // Labour Day
        nth_weekday(year, 9, Weekday::Mon, 1)?,
        // Thanksgiving
        nth_weekday(year, 10, Weekday::Mon, 2)?,
        // Christmas Day, Boxing Day
        ymd(year, 12, 25)?,
        ymd(year, 12, 26)?,
    ];

    if let Some(province) = &region.province {
        match province.to_ascii_uppercase().as_str() {
            "QC" => {
                // Saint-Jean-Baptiste Day
                dates.push(ymd(year, 6, 24)?);
            }
            _ => {
                return Err(SlaError::HolidayLookup(format!(
                    "unsupported Canadian province '{province}'"
                )));
            }
        }
    }
    if let Some(state) = &region.state {
        return Err(SlaError::HolidayLookup(format!(
            "Canadian holidays are keyed by province, not state '{state}'"
        )));
    }

    Ok(dates)
}

// ── Date rule helpers ───────────────────────────────────────────────────────

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, SlaError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| SlaError::HolidayLookup(format!("invalid date {year}-{month:02}-{day:02}")))
}

/// The Nth occurrence of `weekday` in the given month (N >= 1).
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Result<NaiveDate, SlaError> {
    let first = ymd(year, month, 1)?;
    let offset = (weekday.num_days_from_monday() + 7 - first.weekday().num_days_from_monday()) % 7;
    let date = first + Duration::days(i64::from(offset) + i64::from(n - 1) * 7);
    if date.month() != month {
        return Err(SlaError::HolidayLookup(format!(
            "no {n}th {weekday} in {year}-{month:02}"
        )));
    }
    Ok(date)
}

/// The last occurrence of `weekday` in the given month.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Result<NaiveDate, SlaError> {
    let first_of_next = if month == 12 {
        ymd(year + 1, 1, 1)?
    } else {
        ymd(year, month + 1, 1)?
    };
    let last = first_of_next - Duration::days(1);
    let offset = (last.weekday().num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7;
    Ok(last - Duration::days(i64::from(offset)))
}

/// The last `weekday` strictly before `date`.
fn last_weekday_before(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut offset =
        (date.weekday().num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7;
    if offset == 0 {
        offset = 7;
    }
    date - Duration::days(i64::from(offset))
}

/// Easter Sunday for a Gregorian year (anonymous computus).
fn easter_sunday(year: i32) -> Result<NaiveDate, SlaError> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    ymd(year, month as u32, day as u32)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn us() -> HolidayRegion {
        HolidayRegion {
            country: "US".to_string(),
            state: None,
            province: None,
        }
    }

    #[test]
    fn test_us_thanksgiving_2023() {
        let dates = BuiltinHolidays.holidays(&us(), 2023).unwrap();
        assert!(dates.contains(&date(2023, 11, 23)));
    }

    #[test]
    fn test_us_mlk_2024() {
        // Third Monday of January 2024
        let dates = BuiltinHolidays.holidays(&us(), 2024).unwrap();
        assert!(dates.contains(&date(2024, 1, 15)));
    }

    #[test]
    fn test_us_memorial_day_2023() {
        // Last Monday of May 2023
        let dates = BuiltinHolidays.holidays(&us(), 2023).unwrap();
        assert!(dates.contains(&date(2023, 5, 29)));
    }

    #[test]
    fn test_texas_state_extras() {
        let region = HolidayRegion {
            state: Some("TX".to_string()),
            ..us()
        };
        let dates = BuiltinHolidays.holidays(&region, 2023).unwrap();
        assert!(dates.contains(&date(2023, 3, 2)));
        assert!(dates.contains(&date(2023, 4, 21)));
        // Federal set is still present
        assert!(dates.contains(&date(2023, 7, 4)));
    }

    #[test]
    fn test_unknown_us_state_rejected() {
        let region = HolidayRegion {
            state: Some("ZZ".to_string()),
            ..us()
        };
        let err = BuiltinHolidays.holidays(&region, 2023).unwrap_err();
        assert!(matches!(err, SlaError::HolidayLookup(_)), "got: {err}");
    }

    #[test]
    fn test_canada_good_friday_2023() {
        // Easter Sunday 2023 is April 9, Good Friday April 7
        let region = HolidayRegion {
            country: "CA".to_string(),
            state: None,
            province: None,
        };
        let dates = BuiltinHolidays.holidays(&region, 2023).unwrap();
        assert!(dates.contains(&date(2023, 4, 7)));
    }

    #[test]
    fn test_canada_victoria_day_2023() {
        // Monday preceding May 25, 2023 → May 22
        let region = HolidayRegion {
            country: "CA".to_string(),
            state: None,
            province: None,
        };
        let dates = BuiltinHolidays.holidays(&region, 2023).unwrap();
        assert!(dates.contains(&date(2023, 5, 22)));
    }

    #[test]
    fn test_quebec_province_extras() {
        let region = HolidayRegion {
            country: "CA".to_string(),
            state: None,
            province: Some("QC".to_string()),
        };
        let dates = BuiltinHolidays.holidays(&region, 2023).unwrap();
        assert!(dates.contains(&date(2023, 6, 24)));
    }

    #[test]
    fn test_unsupported_country_rejected() {
        let region = HolidayRegion {
            country: "XX".to_string(),
            state: None,
            province: None,
        };
        let err = BuiltinHolidays.holidays(&region, 2023).unwrap_err();
        assert!(matches!(err, SlaError::HolidayLookup(_)), "got: {err}");
    }

    #[test]
    fn test_country_code_case_insensitive() {
        let region = HolidayRegion {
            country: "us".to_string(),
            state: None,
            province: None,
        };
        assert!(BuiltinHolidays.holidays(&region, 2023).is_ok());
    }

    #[test]
    fn test_easter_sunday_known_years() {
        assert_eq!(easter_sunday(2023).unwrap(), date(2023, 4, 9));
        assert_eq!(easter_sunday(2024).unwrap(), date(2024, 3, 31));
        assert_eq!(easter_sunday(2026).unwrap(), date(2026, 4, 5));
    }
}
