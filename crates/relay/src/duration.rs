//! Human-readable durations, e.g. `"2 minutes, 5 seconds"`.
//!
//! Years are 365.25 days and months a twelfth of that. Every non-zero unit is
//! listed largest first; seconds keep their millisecond fraction.

const SECOND: u64 = 1_000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const YEAR: u64 = 31_557_600_000;
const MONTH: u64 = YEAR / 12;

const WHOLE_UNITS: [(u64, &str, &str); 6] = [
    (YEAR, "year", "years"),
    (MONTH, "month", "months"),
    (WEEK, "week", "weeks"),
    (DAY, "day", "days"),
    (HOUR, "hour", "hours"),
    (MINUTE, "minute", "minutes"),
];

/// Renders `millis` as a comma-separated list of units.
pub fn humanize_duration(millis: u64) -> String {
    let mut remaining = millis;
    let mut parts = Vec::new();

    for (unit, singular, plural) in WHOLE_UNITS {
        let count = remaining / unit;
        remaining %= unit;
        if count > 0 {
            parts.push(format!("{} {}", count, if count == 1 { singular } else { plural }));
        }
    }

    if remaining > 0 || parts.is_empty() {
        parts.push(seconds(remaining));
    }

    parts.join(", ")
}

fn seconds(millis: u64) -> String {
    let whole = millis / SECOND;
    let fraction = millis % SECOND;
    if fraction == 0 {
        let unit = if whole == 1 { "second" } else { "seconds" };
        return format!("{whole} {unit}");
    }
    let digits = format!("{fraction:03}");
    format!("{}.{} seconds", whole, digits.trim_end_matches('0'))
}
