use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Time left until `at`, zero if it already passed.
pub fn until(at: DateTime<Utc>) -> std::time::Duration {
    (at - now_utc()).to_std().unwrap_or_default()
}
