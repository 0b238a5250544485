use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

const DATE_LEN: usize = "YYYY-MM-DD".len();

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Formats like `January 2, 2006 at 3:04 PM`.
pub fn human_readable(dt: DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y at %-I:%M %p").to_string()
}

pub fn from_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a `YYYY-MM-DD` date or an RFC 3339 timestamp. A bare date resolves to
/// the start of that day, or to its last instant when `end_of_day` is set.
///
/// A space before the offset is read as `+`, since an unencoded `+` in a query
/// string decodes to a space.
pub fn parse_date_bound(s: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Some(dt) = from_rfc3339(s) {
        return Some(dt);
    }
    if let Some(idx) = s.rfind(' ').filter(|&idx| idx > DATE_LEN) {
        return from_rfc3339(&format!("{}+{}", &s[..idx], &s[idx + 1..]));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)?
    };
    Some(date.and_time(time).and_utc())
}
