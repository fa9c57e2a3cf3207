use chrono::{DateTime, Duration, Utc};

/// Last known credential.
///
/// Token and expiry always travel together; the cache swaps the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: String,
    pub expiry: DateTime<Utc>,
}

impl TokenState {
    /// Never fetched: empty token, expired since the epoch.
    pub fn empty() -> Self {
        Self { access_token: String::new(), expiry: DateTime::<Utc>::UNIX_EPOCH }
    }

    pub fn new(access_token: String, expiry: DateTime<Utc>) -> Self {
        Self { access_token, expiry }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }

    /// `now + skew > expiry`. A token expiring exactly at `now + skew` is still fresh.
    pub fn is_stale(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.is_empty() || now + skew > self.expiry
    }

    /// When a refresh becomes due.
    pub fn refresh_at(&self, skew: Duration) -> DateTime<Utc> {
        self.expiry - skew
    }
}

impl Default for TokenState {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_state_is_always_stale() {
        let now = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert!(TokenState::empty().is_stale(now, Duration::seconds(30)));
    }

    #[test]
    fn staleness_boundary_is_strict() {
        let now = Utc::now();
        let skew = Duration::seconds(30);
        let state = |secs| TokenState::new("T".into(), now + Duration::seconds(secs));

        assert!(state(29).is_stale(now, skew));
        assert!(!state(30).is_stale(now, skew));
        assert!(!state(31).is_stale(now, skew));
    }
}
