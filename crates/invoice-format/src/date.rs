//! Date formatting

use chrono::{DateTime, Days, NaiveDate, Utc};

/// chrono pattern for invoice dates (`dd-MM-yyyy`)
pub const DATE_PATTERN: &str = "%d-%m-%Y";

/// Format a date as `dd-MM-yyyy`
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use invoice_format::format_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(format_date(date), "05-01-2024");
/// ```
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_PATTERN).to_string()
}

/// Date payment is due, `term_days` after `date`
///
/// Saturates at the maximum representable date.
pub fn due_date(date: NaiveDate, term_days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(term_days as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// Timestamp in PDF date syntax, e.g. `D:20240101093000Z`
pub fn format_pdf_timestamp(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}
