use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::helper::RunHelper;
use crate::utils::time::{now_utc, until};
use crate::provider::TokenProvider;
use crate::resilience::retry::RetrySettings;

/// pause before the next cycle after every retry failed
pub const FAILED_CYCLE_PAUSE_SECS: i64 = 5;

/// Refresh the token ahead of expiry, forever.
///
/// Sleeps until `expiry - skew`, then asks the provider, which refreshes
/// because the token just went stale. Requests served meanwhile never wait
/// on the helper. Helper failures are retried and never end the loop.
pub async fn loop_refresh_token<R: RunHelper>(
    provider: TokenProvider<R>,
    retry: RetrySettings,
) -> Result<()> {
    let skew = provider.cache().skew();
    loop {
        info!("refresh token cycle start");

        let sleep_until = match retry.run_with_retry(|| provider.token()).await {
            Ok(state) => state.refresh_at(skew),
            Err(err) => {
                warn!(reason = err.reason(), "background refresh failed, next attempt in {}s", FAILED_CYCLE_PAUSE_SECS);
                now_utc() + chrono::Duration::seconds(FAILED_CYCLE_PAUSE_SECS)
            }
        };

        sleep_until_next_refresh(sleep_until).await;
    }
}

async fn sleep_until_next_refresh(sleep_until: DateTime<Utc>) {
    // at exactly `expiry - skew` the token is still fresh, so never spin on zero
    let interval = until(sleep_until).max(Duration::from_secs(1));
    debug!("sleep interval {:?}, next check start at {}", interval, sleep_until);
    tokio::time::sleep(interval).await;
}
