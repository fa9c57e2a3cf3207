use chrono::Duration;
use serde::Deserialize;

use crate::helper::default_helper_args;
use crate::utils::constants::{DEFAULT_CREDENTIALS_ENV_VAR, DEFAULT_REFRESH_SKEW_SECS};

/// ================================
/// Credential helper
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HelperConfig {
    /// path or name resolved through PATH, e.g. `gcloud`
    pub executable: String,
    #[serde(default = "default_helper_args")]
    pub args: Vec<String>,
    /// invariant: > 0
    #[serde(default = "default_refresh_skew_seconds")]
    pub refresh_skew_seconds: u64,
    /// no bound on the helper run when absent
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// only echoed into error text
    #[serde(default = "default_credentials_env_var")]
    pub credentials_env_var: String,
}

impl HelperConfig {
    /// Defaults for everything except the executable.
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            args: default_helper_args(),
            refresh_skew_seconds: DEFAULT_REFRESH_SKEW_SECS,
            timeout_seconds: None,
            credentials_env_var: DEFAULT_CREDENTIALS_ENV_VAR.to_owned(),
        }
    }

    pub fn refresh_skew(&self) -> Duration {
        Duration::seconds(self.refresh_skew_seconds as i64)
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_seconds.map(std::time::Duration::from_secs)
    }
}

fn default_refresh_skew_seconds() -> u64 {
    DEFAULT_REFRESH_SKEW_SECS
}

fn default_credentials_env_var() -> String {
    DEFAULT_CREDENTIALS_ENV_VAR.to_owned()
}
