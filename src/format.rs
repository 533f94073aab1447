//! Human-readable formatting for durations, publish times and counts.

use chrono::{DateTime, Utc};

/// Relative-time units, largest first, in seconds.
const INTERVALS: [(&str, i64); 6] =
  [("year", 31_536_000), ("month", 2_592_000), ("week", 604_800), ("day", 86_400), ("hour", 3_600), ("minute", 60)];

/// Format an ISO-8601 duration (`PT1H2M3S`) as `1:02:03`, or `4:05` below an hour.
/// Day components are folded into hours. Unparseable input yields `0:00`.
pub fn format_iso_duration(raw: &str) -> String {
  let Some(total) = parse_iso_duration(raw) else { return "0:00".to_string() };
  let hours = total / 3_600;
  let minutes = (total % 3_600) / 60;
  let seconds = total % 60;
  if hours > 0 { format!("{}:{:02}:{:02}", hours, minutes, seconds) } else { format!("{}:{:02}", minutes, seconds) }
}

/// Parse an ISO-8601 duration into whole seconds.
pub fn parse_iso_duration(raw: &str) -> Option<u64> {
  let body = raw.trim().strip_prefix('P')?;
  let (date_part, time_part) = match body.split_once('T') {
    Some((d, t)) => (d, t),
    None => (body, ""),
  };

  let mut total = 0u64;
  let mut seen = false;
  for (part, in_time) in [(date_part, false), (time_part, true)] {
    let mut digits = String::new();
    for c in part.chars() {
      if c.is_ascii_digit() {
        digits.push(c);
        continue;
      }
      let value: u64 = digits.parse().ok()?;
      digits.clear();
      let unit = match (c, in_time) {
        ('D', false) => 86_400,
        ('W', false) => 604_800,
        ('H', true) => 3_600,
        ('M', true) => 60,
        ('S', true) => 1,
        _ => return None,
      };
      total = total.checked_add(value.checked_mul(unit)?)?;
      seen = true;
    }
    if !digits.is_empty() {
      return None;
    }
  }
  seen.then_some(total)
}

/// Parse an RFC 3339 timestamp as returned by the API.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw.trim()).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Format a publish time relative to `now`, e.g. `3 weeks ago`.
/// Anything under a minute old (or in the future) is `just now`.
pub fn format_relative(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let diff = (now - published).num_seconds();
  for (unit, secs) in INTERVALS {
    let n = diff / secs;
    if n >= 1 {
      return format!("{} {}{} ago", n, unit, if n > 1 { "s" } else { "" });
    }
  }
  "just now".to_string()
}

/// Compact count, e.g. `1.2M`, `3.4K`, `999`. Rounds to one decimal; a value
/// that rounds up to `1000.0K` is shown in millions instead.
pub fn format_compact(n: u64) -> String {
  let tenths_k = n.saturating_add(50) / 100;
  if n >= 1_000_000 || tenths_k >= 10_000 {
    let tenths_m = n.saturating_add(50_000) / 100_000;
    format!("{}.{}M", tenths_m / 10, tenths_m % 10)
  } else if n >= 1_000 {
    format!("{}.{}K", tenths_k / 10, tenths_k % 10)
  } else {
    n.to_string()
  }
}

/// Minute label used by the duration filter, e.g. `45m`, `1h`, `1h 30m`.
pub fn format_minutes(minutes: u32) -> String {
  if minutes < 60 {
    return format!("{}m", minutes);
  }
  let hours = minutes / 60;
  let mins = minutes % 60;
  if mins > 0 { format!("{}h {}m", hours, mins) } else { format!("{}h", hours) }
}
