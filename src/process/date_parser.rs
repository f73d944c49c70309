use chrono::NaiveDate;

use crate::error::DateError;

const MIN_YEAR: u32 = 1;
const MAX_YEAR: u32 = 9999;

/// Parse `"M/D/YYYY"` (as written in the POD export) into a calendar date.
///
/// Exactly three numeric `/`-separated parts are required; surrounding
/// whitespace on each part is ignored. Years are taken literally, so a
/// two-digit year stays in the first century. Years outside 1..=9999 are
/// rejected as out of range.
pub fn parse_mdy(s: &str) -> Result<NaiveDate, DateError> {
    let s = s.trim();
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return Err(DateError::Shape(s.to_string()));
    }

    let num = |p: &str| -> Result<u32, DateError> {
        p.trim()
            .parse::<u32>()
            .map_err(|_| DateError::NotNumeric(s.to_string()))
    };
    let month = num(parts[0])?;
    let day = num(parts[1])?;
    let year = num(parts[2])?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(DateError::OutOfRange(s.to_string()));
    }
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| DateError::OutOfRange(s.to_string()))
}

/// Like [`parse_mdy`], but an empty string is "no date" rather than an error.
pub fn parse_optional_mdy(s: &str) -> Result<Option<NaiveDate>, DateError> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_mdy(s).map(Some)
    }
}
