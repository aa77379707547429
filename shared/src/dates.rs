use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

pub const UNKNOWN_DATE: &str = "Unknown date";
pub const UNKNOWN_RELATIVE: &str = "Unknown";

const DAY_MS: f64 = 86_400_000.0;

/// Accepts RFC 3339 timestamps as served by the API, or a bare ISO timestamp taken as UTC.
pub fn parse_launch_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Short zone label the way en-US date formatting prints it.
#[must_use]
pub fn offset_label(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return "UTC".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if minutes == 0 {
        format!("GMT{sign}{hours}")
    } else {
        format!("GMT{sign}{hours}:{minutes:02}")
    }
}

/// `"March 24, 2006 at 10:30 PM UTC"`, rendered in `offset`.
#[must_use]
pub fn format_launch_date(date: &str, offset: FixedOffset) -> String {
    let Some(parsed) = parse_launch_date(date) else {
        return UNKNOWN_DATE.to_string();
    };
    let local = parsed.with_timezone(&offset);
    format!(
        "{} {}",
        local.format("%B %-d, %Y at %I:%M %p"),
        offset_label(offset)
    )
}

/// Signed whole days from `now` to `date`, rounded toward the future.
#[must_use]
pub fn days_until(date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff_ms = (date - now).num_milliseconds();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    {
        (diff_ms as f64 / DAY_MS).ceil() as i64
    }
}

fn ceil_div(n: i64, d: i64) -> i64 {
    (n + d - 1) / d
}

#[must_use]
pub fn relative_time(date: &str, now: DateTime<Utc>) -> String {
    let Some(parsed) = parse_launch_date(date) else {
        return UNKNOWN_RELATIVE.to_string();
    };
    let days = days_until(parsed, now);

    if days > 0 {
        match days {
            1 => "Tomorrow".to_string(),
            2..=6 => format!("In {days} days"),
            7..=29 => format!("In {} weeks", ceil_div(days, 7)),
            30..=364 => format!("In {} months", ceil_div(days, 30)),
            _ => format!("In {} years", ceil_div(days, 365)),
        }
    } else {
        let days = days.abs();
        match days {
            0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            2..=6 => format!("{days} days ago"),
            7..=29 => format!("{} weeks ago", ceil_div(days, 7)),
            30..=364 => format!("{} months ago", ceil_div(days, 30)),
            _ => format!("{} years ago", ceil_div(days, 365)),
        }
    }
}
