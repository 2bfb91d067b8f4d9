//! `dd/mm/yyyy` calendar dates.

use chrono::NaiveDate;

/// Parse `dd/mm/yyyy` into a calendar date.
///
/// Requires exactly three non-empty, all-digit components and a real
/// calendar date (no Feb 30, no month 13, no year 0). Years are taken
/// literally: `24` is year 24, not 2024.
pub fn parse_fecha(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    if [day, month, year]
        .iter()
        .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if year < 1 {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Render a date as zero-padded `dd/mm/yyyy`.
pub fn format_fecha(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
