//! Fixed-width timestamp prefixes.
//!
//! Two grammars are recognised at the start of a line:
//!
//! * `YYYY-MM-DDTHH:MM:SSZ`, read as UTC
//! * `YYYY-MM-DD HH:MM:SS`, read in the local timezone of the process
//!
//! Both collapse to epoch seconds so they can be compared against each other.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use crate::bytes::is_space;

const BASE_LEN: usize = 19;

/// How the wall-clock fields were interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone { Utc, Local }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub epoch_seconds: i64,
    /// Bytes of the line taken by the timestamp (19 or 20).
    pub consumed: usize,
    pub zone: Zone,
}

pub fn is_leap_year(year: i32) -> bool {
    if year % 400 == 0 { return true; }
    if year % 100 == 0 { return false; }
    year % 4 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    const DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => DAYS[(month - 1) as usize],
        _ => 0,
    }
}

fn fixed_digits(b: &[u8], pos: usize, len: usize) -> Option<u32> {
    let field = b.get(pos..pos + len)?;
    field.iter().try_fold(0u32, |acc, &c| c.is_ascii_digit().then(|| acc * 10 + u32::from(c - b'0')))
}

/// Parses a timestamp at the start of `line`. Trailing content is allowed when
/// it is separated from the timestamp by whitespace.
pub fn parse_prefix(line: impl AsRef<[u8]>) -> Option<ParsedTimestamp> {
    let b = line.as_ref();
    if b.len() < BASE_LEN { return None; }
    if b[4] != b'-' || b[7] != b'-' || b[13] != b':' || b[16] != b':' { return None; }
    let zone = match b[10] { b'T' => Zone::Utc, b' ' => Zone::Local, _ => return None };

    let year = fixed_digits(b, 0, 4)? as i32;
    let month = fixed_digits(b, 5, 2)?;
    let day = fixed_digits(b, 8, 2)?;
    let hour = fixed_digits(b, 11, 2)?;
    let minute = fixed_digits(b, 14, 2)?;
    let second = fixed_digits(b, 17, 2)?;

    if !(1..=12).contains(&month) { return None; }
    if day < 1 || day > days_in_month(year, month) { return None; }
    if hour > 23 || minute > 59 || second > 59 { return None; }

    let consumed = match zone {
        Zone::Utc => {
            if b.get(BASE_LEN) != Some(&b'Z') { return None; }
            BASE_LEN + 1
        }
        Zone::Local => BASE_LEN,
    };
    if let Some(&next) = b.get(consumed) && !is_space(next) { return None; }

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let epoch_seconds = to_epoch(naive, zone)?;
    Some(ParsedTimestamp { epoch_seconds, consumed, zone })
}

/// Parses a whole argument as a timestamp. Surrounding whitespace is ignored,
/// anything else after the timestamp is rejected.
pub fn parse_exact(input: &str) -> Option<i64> {
    let trimmed = input.trim_matches(|c: char| c.is_ascii() && is_space(c as u8));
    let parsed = parse_prefix(trimmed)?;
    (parsed.consumed == trimmed.len()).then_some(parsed.epoch_seconds)
}

fn to_epoch(naive: NaiveDateTime, zone: Zone) -> Option<i64> {
    match zone {
        Zone::Utc => Some(naive.and_utc().timestamp()),
        Zone::Local => resolve_local(&Local, naive),
    }
}

/// Wall-clock time to epoch seconds in `tz`. Ambiguous times (DST fold) take
/// the earlier instant. Times skipped by a forward transition are read with
/// the offset in force before it, so 02:30 in a 02:00 -> 03:00 gap lands on 03:30.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<i64> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() { return Some(dt.timestamp()); }
    let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
    tz.from_local_datetime(&shifted).earliest().map(|dt| dt.timestamp())
}
