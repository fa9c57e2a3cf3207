//! Shared constants and invariants

/// refresh this long before the helper-reported expiry
pub const DEFAULT_REFRESH_SKEW_SECS: u64 = 30;

/// echoed into helper failure text, never interpreted
pub const DEFAULT_CREDENTIALS_ENV_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 1000;
