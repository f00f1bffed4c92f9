//! # sla-engine
//!
//! Deterministic SLA expiration computation.
//!
//! Given a start instant, a duration in hours, days, or weeks, and optional
//! business-hour, weekend, holiday, and excluded-date rules, the engine
//! produces the exact instant the SLA expires. It is a pure calendar
//! function: single call in, single immutable result out, no system clock
//! access, no I/O. Each call is independent and safe to run concurrently.
//!
//! ## Modules
//!
//! - [`request`] — input validation and canonicalization ([`SlaParams`] → [`SlaRequest`])
//! - [`availability`] — per-day open/close windows and the resolved exclusion set
//! - [`holidays`] — the [`HolidayLookup`] capability and the built-in regional calendar
//! - [`engine`] — the advancement loop and the [`calculate`] entry point
//! - [`error`] — error types
//!
//! ## Example
//!
//! ```
//! use sla_engine::{calculate, SlaParams};
//!
//! let params = SlaParams {
//!     start_time: "2023-10-18 01:27".into(),
//!     time_zone: "America/Chicago".to_string(),
//!     skip_business_hours: false,
//!     open_hour: 9,
//!     close_hour: 17,
//!     sla_hours: Some(6),
//!     ..SlaParams::default()
//! };
//!
//! let result = calculate(&params).unwrap();
//! assert_eq!(result.to_string(), "2023-10-18T15:00:00-05:00");
//! ```

pub mod availability;
pub mod engine;
pub mod error;
pub mod holidays;
pub mod request;

pub use availability::{day_window, DayWindow, ResolvedExclusions};
pub use engine::{calculate, calculate_with, SlaResult};
pub use error::SlaError;
pub use holidays::{BuiltinHolidays, HolidayLookup, HolidayRegion};
pub use request::{normalize, SlaDuration, SlaParams, SlaRequest, StartTime};
