//! FHIR primitive value checks.
//!
//! Only the primitives the bridge actually emits are covered: `id`, `date` and `dateTime`.

use chrono::{DateTime, NaiveDate};

/// Maximum length of a FHIR `id`.
pub const MAX_ID_LEN: usize = 64;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns true if `id` is a valid FHIR logical id (`[A-Za-z0-9\-\.]{1,64}`).
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.'))
}

/// Parse a full FHIR `date` (`YYYY-MM-DD`).
///
/// The shape is checked byte by byte first: chrono alone also accepts unpadded fields and
/// a signed year.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || !has_year_month_shape(&bytes[..7]) || bytes[7] != b'-' {
        return None;
    }
    if !all_digits(&bytes[8..]) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Render a date in FHIR `date` form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Returns true if `value` is a FHIR `dateTime`: either a full date or an RFC 3339 timestamp.
///
/// Partial dates (`YYYY`, `YYYY-MM`) are accepted as well, since the wire format allows them.
pub fn is_valid_date_time(value: &str) -> bool {
    if parse_date(value).is_some() || DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }

    // Reduced precision: "2024" or "2024-03"
    let bytes = value.as_bytes();
    match bytes.len() {
        4 => all_digits(bytes),
        7 => has_year_month_shape(bytes) && matches!(value[5..].parse::<u32>(), Ok(1..=12)),
        _ => false,
    }
}

/// `YYYY-MM` with every digit present.
fn has_year_month_shape(bytes: &[u8]) -> bool {
    bytes.len() == 7 && all_digits(&bytes[..4]) && bytes[4] == b'-' && all_digits(&bytes[5..7])
}

fn all_digits(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_digit)
}
