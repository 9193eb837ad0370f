const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

pub const NO_ACTIVITY: &str = "no activity yet";

/// Renders a unix timestamp (seconds) relative to `now`.
pub fn humanize_last_activity(timestamp: Option<i64>, now: i64) -> String {
    let timestamp = match timestamp {
        Some(timestamp) if timestamp > 0 => timestamp,
        _ => return NO_ACTIVITY.to_string(),
    };
    let diff = now.saturating_sub(timestamp).max(0);
    if diff < SECONDS_PER_MINUTE {
        format!("{} seconds ago", diff)
    } else if diff < SECONDS_PER_HOUR {
        format!("{} minutes ago", diff / SECONDS_PER_MINUTE)
    } else if diff < SECONDS_PER_DAY {
        format!("{} hours ago", diff / SECONDS_PER_HOUR)
    } else {
        format!("{} days ago", diff / SECONDS_PER_DAY)
    }
}

pub fn humanize_since_now(timestamp: Option<i64>) -> String {
    humanize_last_activity(timestamp, chrono::Utc::now().timestamp())
}
