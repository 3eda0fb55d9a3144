use chrono::{DateTime, Utc};

/// Truncate string to a max length, adding an ellipsis when truncated.
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }

    if s.chars().count() <= max_len {
        return s.to_string();
    }

    if max_len <= 3 {
        return ".".repeat(max_len);
    }

    let take = max_len - 3;
    let mut truncated: String = s.chars().take(take).collect();
    truncated.push_str("...");
    truncated
}

/// Format a timestamp relative to `now` (e.g., "2m ago", "1h ago").
/// Anything older than four weeks falls back to a calendar date.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_seconds().max(0);

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else if diff < 604800 {
        format!("{}d ago", diff / 86400)
    } else if diff < 4 * 604800 {
        format!("{}w ago", diff / 604800)
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        (now - Duration::seconds(secs_ago), now)
    }

    #[test]
    fn test_relative_time_buckets() {
        let (ts, now) = at(10);
        assert_eq!(format_relative_time(ts, now), "just now");
        let (ts, now) = at(5 * 60);
        assert_eq!(format_relative_time(ts, now), "5m ago");
        let (ts, now) = at(3 * 3600);
        assert_eq!(format_relative_time(ts, now), "3h ago");
        let (ts, now) = at(2 * 86400);
        assert_eq!(format_relative_time(ts, now), "2d ago");
        let (ts, now) = at(8 * 86400);
        assert_eq!(format_relative_time(ts, now), "1w ago");
        let (ts, now) = at(60 * 86400);
        assert_eq!(format_relative_time(ts, now), "2024-03-21");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        let (now, _) = at(0);
        let future = now + Duration::seconds(30);
        assert_eq!(format_relative_time(future, now), "just now");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 8), "hello...");
        assert_eq!(truncate_with_ellipsis("hello", 2), "..");
        assert_eq!(truncate_with_ellipsis("hello", 0), "");
    }
}
