//! Public entry point: a ready-to-use `Authorization` value.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use http::HeaderValue;

use crate::cache::{TokenCache, TokenState};
use crate::config::helper::HelperConfig;
use crate::error::{ParseError, ProviderError};
use crate::helper::{ProcessRunner, RunHelper};
use crate::utils::time::now_utc;

/// Bearer credentials minted by an external helper.
///
/// Holds its own cache; clones share it. Build one per client (or one per
/// process) and keep it for as long as requests need credentials.
pub struct TokenProvider<R: RunHelper = ProcessRunner> {
    cache: TokenCache<R>,
}

impl<R: RunHelper> Clone for TokenProvider<R> {
    fn clone(&self) -> Self {
        Self { cache: self.cache.clone() }
    }
}

impl TokenProvider<ProcessRunner> {
    pub fn new(helper: HelperConfig) -> Result<Self> {
        Self::with_runner(ProcessRunner, helper)
    }
}

impl<R: RunHelper> TokenProvider<R> {
    pub fn with_runner(runner: R, helper: HelperConfig) -> Result<Self> {
        if helper.executable.trim().is_empty() {
            bail!("credential helper executable must not be empty");
        }
        if helper.refresh_skew_seconds == 0 {
            bail!("refresh skew must be greater than 0");
        }
        Ok(Self { cache: TokenCache::new(runner, helper) })
    }

    pub fn cache(&self) -> &TokenCache<R> {
        &self.cache
    }

    /// `Bearer <token>` for a token valid at `now`, refreshing first if needed.
    pub async fn get_authorization_value(&self, now: DateTime<Utc>) -> Result<HeaderValue, ProviderError> {
        let state = self.cache.get_valid_token(now).await?;
        bearer(&state)
    }

    /// Same as [`Self::get_authorization_value`] against the system clock.
    pub async fn authorization_value(&self) -> Result<HeaderValue, ProviderError> {
        self.get_authorization_value(now_utc()).await
    }

    /// Valid token state at the system clock, for callers that need the expiry too.
    pub async fn token(&self) -> Result<TokenState, ProviderError> {
        self.cache.get_valid_token(now_utc()).await
    }
}

/// Tokens are checked for header-safe bytes when parsed, so this does not fail in practice.
pub fn bearer(state: &TokenState) -> Result<HeaderValue, ProviderError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", state.access_token))
        .map_err(|_| ProviderError::MalformedCredential(ParseError::InvalidToken))?;
    value.set_sensitive(true);
    Ok(value)
}
