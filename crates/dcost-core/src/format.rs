//! Rounding and display helpers shared by every view
//!
//! Amounts are accumulated at full precision and rounded only when a view is
//! produced. Rounding goes through the exact decimal expansion of the `f64`,
//! so `3.005` (stored as 3.00499…) rounds to `3.0` rather than `3.01`.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Display format of execution start/end times
pub const EXECUTION_TIME_FORMAT: &str = "%m/%d %I:%M %p";

/// Day key format of collapsed daily series
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Sub-day key format of the `today` series
pub const SUB_DAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Round to two decimal places
///
/// ```
/// use dcost_core::format::round2;
///
/// assert_eq!(round2(1.004 + 2.001), 3.0);
/// assert_eq!(round2(2.675), 2.67);
/// assert_eq!(round2(1.0 / 3.0), 0.33);
/// ```
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = format!("{value:.2}").parse::<f64>().unwrap_or(value);
    // avoid "-0.0" in output
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Dollar string of a rounded amount, shortest form
///
/// ```
/// use dcost_core::format::format_currency;
///
/// assert_eq!(format_currency(1.004 + 2.001), "$3.0");
/// assert_eq!(format_currency(12.345_1), "$12.35");
/// assert_eq!(format_currency(0.1), "$0.1");
/// ```
pub fn format_currency(amount: f64) -> String {
    format!("${:?}", round2(amount))
}

/// Compact "MM/DD hh:mm AM/PM" rendering in the given timezone
pub fn format_execution_time(dt: &DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format(EXECUTION_TIME_FORMAT).to_string()
}
