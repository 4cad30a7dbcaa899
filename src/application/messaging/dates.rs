//! Date argument grammars
//!
//! Tried in a fixed order, first hit wins:
//! 1. relative duration (`1d2h`, `90m`, `30s1m`; units in any order, each at most once;
//!    a bare integer counts as minutes)
//! 2. clock time on the current date (`14:30`, `9am`, `9:15pm`)
//! 3. absolute date/time (RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD`)

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;

static RELATIVE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)^(?:\d+[dhms])+$").ok());

static RELATIVE_PART: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)(\d+)([dhms])").ok());

static CLOCK_24H: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").ok());

static CLOCK_12H: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?(am|pm)$").ok());

/// Roughly a century, keeps offsets inside chrono's range
const MAX_OFFSET_SECS: i64 = 100 * 366 * 86_400;

/// Parse a date argument token relative to `now`
pub fn parse_date(token: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    parse_relative(token, now)
        .or_else(|| parse_clock(token, now))
        .or_else(|| parse_absolute(token))
}

fn parse_relative(token: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        let minutes: i64 = token.parse().ok()?;
        return offset(now, minutes.checked_mul(60)?);
    }

    if !RELATIVE.as_ref()?.is_match(token) {
        return None;
    }

    let mut seen = [false; 4];
    let mut total: i64 = 0;
    for caps in RELATIVE_PART.as_ref()?.captures_iter(token) {
        let n: i64 = caps.get(1)?.as_str().parse().ok()?;
        let (index, unit) = match caps.get(2)?.as_str().to_ascii_lowercase().as_str() {
            "d" => (0, 86_400_i64),
            "h" => (1, 3_600),
            "m" => (2, 60),
            _ => (3, 1),
        };
        if seen[index] {
            return None;
        }
        seen[index] = true;
        total = total.checked_add(n.checked_mul(unit)?)?;
    }

    offset(now, total)
}

fn offset(now: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    if seconds > MAX_OFFSET_SECS {
        return None;
    }
    now.checked_add_signed(Duration::seconds(seconds))
}

fn parse_clock(token: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (hour, minute) = if let Some(caps) = CLOCK_24H.as_ref()?.captures(token) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
        (hour, minute)
    } else {
        let caps = CLOCK_12H.as_ref()?.captures(token)?;
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps.get(3)?.as_str().eq_ignore_ascii_case("pm");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };
        (hour, minute)
    };

    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(Utc.from_utc_datetime(&now.date_naive().and_time(time)))
}

fn parse_absolute(token: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(token) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(token, format) {
            return Some(Utc.from_utc_datetime(&parsed));
        }
    }

    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
