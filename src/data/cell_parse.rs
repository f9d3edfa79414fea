//! Parsing of rendered cell text into typed values
//!
//! Cells arrive as display text ("$1,250.00", "Mar 3, 2024"). Sorting and
//! date range filtering need the typed value behind that text, and column
//! type inference needs to know which parses succeed.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::data::datatable::ColumnType;

/// Characters that decorate a currency amount without changing its value
static CURRENCY_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[$,\s]").unwrap());

/// Date-time layouts, tried after RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Date-only layouts. Slash dates are month first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

/// Number of rows sampled when inferring a column type
pub const INFERENCE_SAMPLE_SIZE: usize = 100;

/// Parse cell text as a point in time. Date-only values land on midnight.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parse a date filter bound typed by the user
pub fn parse_date_bound(text: &str) -> Option<NaiveDate> {
    parse_date(text).map(|dt| dt.date())
}

/// Parse currency text: `$` and `,` are stripped, the rest must be a finite
/// number. Trailing text such as a unit suffix makes the cell unparseable.
pub fn parse_currency(text: &str) -> Option<f64> {
    let cleaned = CURRENCY_NOISE.replace_all(text, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Infer a column type from sample cell text.
///
/// Empty cells are ignored. A column is `Currency` when every other sample
/// parses as an amount, `Date` when every other sample parses as a date, and
/// `String` otherwise.
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: Iterator<Item = &'a str>,
{
    let mut seen_any = false;
    let mut all_currency = true;
    let mut all_dates = true;

    for value in values.take(INFERENCE_SAMPLE_SIZE) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        seen_any = true;

        if all_currency && parse_currency(value).is_none() {
            all_currency = false;
        }
        if all_dates && parse_date(value).is_none() {
            all_dates = false;
        }

        if !all_currency && !all_dates {
            break;
        }
    }

    match (seen_any, all_currency, all_dates) {
        (false, _, _) => ColumnType::String,
        (true, true, _) => ColumnType::Currency,
        (true, false, true) => ColumnType::Date,
        _ => ColumnType::String,
    }
}
