//! Time-string parsing for `--min-time` / `--max-time`
//!
//! Accepted forms (case-insensitive):
//! - `now`, `today`, `yesterday`, `tomorrow`
//! - `<day> at <time>`: `yesterday at noon`, `today at 4am`, `2024-01-15 at 16:30`
//! - relative: `90s`, `15m`, `2h`, `3d`, `1w`, optionally followed by `ago`,
//!   or spelled out: `2 hours ago`, `1 day ago`
//! - absolute: RFC 3339, `2024-01-15`, `2024-01-15 10:30[:00]`, `2024-01-15T10:30:00`
//!
//! Dates and times without an offset are read in the caller's time zone.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Parse `input` relative to `now`. `None` if the string isn't understood.
pub fn parse_time<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed == "now" {
        return Some(now.with_timezone(&Utc));
    }

    if let Some(dur) = parse_relative(&trimmed) {
        // Offsets past the representable range are not a time
        return now.with_timezone(&Utc).checked_sub_signed(dur);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input.trim()) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(input.trim(), format) {
            return localize(ndt, now);
        }
    }

    let (day, time) = match trimmed.split_once(" at ") {
        Some((day, time)) => (day.trim(), Some(time.trim())),
        None => (trimmed.as_str(), None),
    };

    let date = parse_day(day, now)?;
    let time = match time {
        Some(t) => parse_clock(t)?,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };
    localize(date.and_time(time), now)
}

/// Parse a user-supplied bound.
///
/// An unparseable string yields no bound, which widens the query; that is
/// logged as a warning. With `strict` it is an error instead.
pub fn resolve_bound<Tz: TimeZone>(
    flag: &str,
    input: &str,
    now: &DateTime<Tz>,
    strict: bool,
) -> Result<Option<DateTime<Utc>>> {
    match parse_time(input, now) {
        Some(t) => {
            tracing::debug!("{} {:?} resolved to {}", flag, input, t);
            Ok(Some(t))
        }
        None if strict => bail!("Could not parse {} {:?}", flag, input),
        None => {
            tracing::warn!(
                "Could not parse {} {:?}; searching without that bound",
                flag,
                input
            );
            Ok(None)
        }
    }
}

fn localize<Tz: TimeZone>(ndt: NaiveDateTime, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    now.timezone()
        .from_local_datetime(&ndt)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_day<Tz: TimeZone>(day: &str, now: &DateTime<Tz>) -> Option<NaiveDate> {
    let today = now.date_naive();
    match day {
        "today" => Some(today),
        "yesterday" => today.pred_opt(),
        "tomorrow" => today.succ_opt(),
        _ => NaiveDate::parse_from_str(day, "%Y-%m-%d").ok(),
    }
}

/// `noon`, `midnight`, `4am`, `4:30pm`, `16:30`, `16:30:15`
fn parse_clock(raw: &str) -> Option<NaiveTime> {
    match raw {
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
        _ => {}
    }

    let (clock, meridiem) = if let Some(c) = raw.strip_suffix("am") {
        (c.trim(), Some(false))
    } else if let Some(c) = raw.strip_suffix("pm") {
        (c.trim(), Some(true))
    } else {
        (raw, None)
    };

    let mut parts = clock.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    let second: u32 = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    if parts.next().is_some() {
        return None;
    }

    let hour = match meridiem {
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// `2h`, `2h ago`, `2 hours ago`, `1 day ago`
fn parse_relative(raw: &str) -> Option<Duration> {
    let raw = raw.strip_suffix("ago").unwrap_or(raw).trim();
    let split = raw.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = raw.split_at(split);
    let amount: i64 = amount.parse().ok()?;

    let unit = unit.trim();
    let unit = unit.strip_suffix('s').filter(|u| u.len() > 1).unwrap_or(unit);
    match unit {
        "s" | "sec" | "second" => Duration::try_seconds(amount),
        "m" | "min" | "minute" => Duration::try_minutes(amount),
        "h" | "hr" | "hour" => Duration::try_hours(amount),
        "d" | "day" => Duration::try_days(amount),
        "w" | "week" => Duration::try_weeks(amount),
        _ => None,
    }
}
