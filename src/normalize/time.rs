use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::Node;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const YEAR: u64 = 365 * DAY;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Compact human duration: `2y 3d 4h`, `1d 1h`, `5h 12m`.
///
/// Minutes only appear when there are no years or days. Anything positive
/// below a minute is `Under 1 min`; zero, negative, non-finite and missing
/// values give `unset`.
pub fn compact(seconds: Option<f64>, unset: &str) -> String {
    let total = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s as u64,
        _ => return unset.to_string(),
    };

    let years = total / YEAR;
    let days = (total % YEAR) / DAY;
    let hours = (total % DAY) / HOUR;
    let minutes = (total % HOUR) / MINUTE;

    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{years}y"));
    }
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 && years == 0 && days == 0 {
        parts.push(format!("{minutes}m"));
    }

    if parts.is_empty() {
        "Under 1 min".to_string()
    } else {
        parts.join(" ")
    }
}

/// Uptime clock: `1d 1h 1m 1s`. Seconds are always shown.
pub fn clock(seconds: Option<f64>) -> Option<String> {
    let total = match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => s as u64,
        _ => return None,
    };
    let units = [
        (total / DAY, 'd'),
        ((total % DAY) / HOUR, 'h'),
        ((total % HOUR) / MINUTE, 'm'),
    ];
    let mut out = String::new();
    for (value, suffix) in units {
        if value > 0 {
            out.push_str(&format!("{value}{suffix} "));
        }
    }
    out.push_str(&format!("{}s", total % MINUTE));
    Some(out)
}

/// Generation time of a snapshot. Numbers are epoch seconds (or
/// milliseconds when large enough), strings are RFC 3339 or
/// `YYYY-MM-DD HH:MM:SS`; unparseable strings are shown as they are.
pub fn timestamp(node: Node<'_>) -> Option<String> {
    match node.value()? {
        Value::Number(n) => {
            let raw = n.as_f64()?;
            let secs = if raw > 1e11 { raw / 1000.0 } else { raw };
            DateTime::<Utc>::from_timestamp(secs as i64, 0)
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        }
        Value::String(s) if !s.is_empty() => {
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Some(t.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string());
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(t.and_utc().format(TIMESTAMP_FORMAT).to_string());
                }
            }
            Some(s.clone())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_drops_minutes_when_days_present() {
        assert_eq!(compact(Some(90061.0), "N/A"), "1d 1h");
        assert_eq!(compact(Some(3.0 * 3600.0 + 125.0), "N/A"), "3h 2m");
        assert_eq!(compact(Some((YEAR + DAY + 3 * HOUR + 7 * MINUTE) as f64), "N/A"), "1y 1d 3h");
    }

    #[test]
    fn compact_floor_and_unset() {
        assert_eq!(compact(Some(45.0), "N/A"), "Under 1 min");
        assert_eq!(compact(Some(0.4), "N/A"), "Under 1 min");
        assert_eq!(compact(Some(0.0), "N/A"), "N/A");
        assert_eq!(compact(Some(-10.0), "N/A"), "N/A");
        assert_eq!(compact(Some(f64::NAN), "N/A"), "N/A");
        assert_eq!(compact(None, "Unlimited / N/A"), "Unlimited / N/A");
    }

    #[test]
    fn clock_always_shows_seconds() {
        assert_eq!(clock(Some(90061.0)).as_deref(), Some("1d 1h 1m 1s"));
        assert_eq!(clock(Some(59.0)).as_deref(), Some("59s"));
        assert_eq!(clock(Some(0.0)).as_deref(), Some("0s"));
        assert_eq!(clock(Some(2.0 * DAY as f64 + 5.0)).as_deref(), Some("2d 5s"));
        assert_eq!(clock(None), None);
    }

    #[test]
    fn timestamps_from_numbers_and_strings() {
        let raw = json!({
            "secs": 1_700_000_000,
            "millis": 1_700_000_000_000u64,
            "iso": "2023-11-14T22:13:20Z",
            "plain": "2023-11-14 22:13:20",
            "odd": "yesterday",
        });
        let root = Node::new(&raw);
        let expected = Some("2023-11-14 22:13:20 UTC".to_string());
        assert_eq!(timestamp(root.get("secs")), expected);
        assert_eq!(timestamp(root.get("millis")), expected);
        assert_eq!(timestamp(root.get("iso")), expected);
        assert_eq!(timestamp(root.get("plain")), expected);
        assert_eq!(timestamp(root.get("odd")).as_deref(), Some("yesterday"));
        assert_eq!(timestamp(root.get("none")), None);
    }
}
