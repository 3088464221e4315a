//! ERP date handling
//!
//! The ERP reports `CreateDate`/`UpdateDate` as `yyyyMMdd` strings. Some
//! Service Layer endpoints return ISO timestamps instead, so the parser also
//! accepts a leading `yyyy-MM-dd`.

use chrono::{DateTime, NaiveDate, Utc};

use crate::constants::ERP_DATE_FORMAT;

/// Parse an ERP date into midnight UTC of that day.
///
/// Returns `None` for empty or malformed input.
pub fn parse_erp_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let date = NaiveDate::parse_from_str(trimmed, ERP_DATE_FORMAT)
        .ok()
        .or_else(|| trimmed.get(..10).and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()))?;

    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Format a timestamp as an ERP `yyyyMMdd` date.
pub fn format_erp_date(at: DateTime<Utc>) -> String {
    at.format(ERP_DATE_FORMAT).to_string()
}
