//! ISO-8601 timestamp parsing and formatting
//!
//! Accepted inputs, extended or basic format:
//! - date: `2024-05-01`, `20240501`, `2024-05`, `2024`
//! - optional time after `T` or a space: `10`, `10:30`, `10:30:00.250`,
//!   `1030`, `103000,5`
//! - optional offset: `Z`, `+02`, `+0200`, `+02:00`
//!
//! Without an offset the time is read as UTC; a bare date is midnight UTC.
//! Parsed instants are truncated to milliseconds.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, SubsecRound, Utc};

const CLOCK_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

/// Parses an ISO-8601 string into a UTC instant.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if !input.is_ascii() {
        return None;
    }

    let (date_part, time_part) = match input.find(|c: char| matches!(c, 'T' | 't' | ' ')) {
        Some(pos) => (&input[..pos], Some(&input[pos + 1..])),
        None => (input, None),
    };

    let date = parse_date(date_part)?;
    let Some(time_part) = time_part else {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    };

    let (clock, offset) = split_offset(time_part)?;
    let local = NaiveDateTime::new(date, parse_clock(clock)?);
    let instant = match offset {
        Some(offset) => local.and_local_timezone(offset).single()?.with_timezone(&Utc),
        None => local.and_utc(),
    };
    Some(instant.trunc_subsecs(3))
}

/// Formats an instant as RFC 3339 with milliseconds and a `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let (year, month, day) = match raw.len() {
        4 => (raw, "1", "1"),
        7 if bytes[4] == b'-' => (&raw[..4], &raw[5..], "1"),
        8 => (&raw[..4], &raw[4..6], &raw[6..]),
        10 if bytes[4] == b'-' && bytes[7] == b'-' => (&raw[..4], &raw[5..7], &raw[8..]),
        _ => return None,
    };

    if ![year, month, day].into_iter().all(all_digits) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Splits a trailing UTC offset off the time of day.
fn split_offset(time: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(clock) = time.strip_suffix('Z').or_else(|| time.strip_suffix('z')) {
        return Some((clock, FixedOffset::east_opt(0)));
    }

    match time.rfind(|c: char| c == '+' || c == '-') {
        Some(pos) => Some((&time[..pos], Some(parse_offset(&time[pos..])?))),
        None => Some((time, None)),
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };

    let (hours, minutes) = match rest.len() {
        2 => (rest, "00"),
        4 => rest.split_at(2),
        5 if rest.as_bytes()[2] == b':' => (&rest[..2], &rest[3..]),
        _ => return None,
    };
    if !all_digits(hours) || !all_digits(minutes) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.replace(',', ".");
    if raw.len() == 2 {
        if !all_digits(&raw) {
            return None;
        }
        return NaiveTime::from_hms_opt(raw.parse().ok()?, 0, 0);
    }
    CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&raw, format).ok())
}
