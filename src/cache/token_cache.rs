use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::token::TokenState;
use crate::config::helper::HelperConfig;
use crate::error::{LaunchError, ProviderError};
use crate::helper::{HelperOutput, ProcessRunner, RunHelper};
use crate::observability::metrics::get_metrics;
use crate::parser::parse_credential;
use crate::utils::time::get_instant;

type RefreshOutcome = Result<TokenState, ProviderError>;
type InFlight = watch::Receiver<Option<RefreshOutcome>>;

/// Cached helper token with single-flight refresh.
///
/// Cheap to clone; clones share the same state. At most one helper process
/// runs per cache at any time, and every caller that finds a refresh in
/// flight receives that refresh's outcome.
pub struct TokenCache<R: RunHelper = ProcessRunner> {
    inner: Arc<Inner<R>>,
}

impl<R: RunHelper> Clone for TokenCache<R> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

struct Inner<R> {
    runner: R,
    helper: HelperConfig,
    skew: Duration,
    state: RwLock<TokenState>,
    // Some while a refresh task is running
    in_flight: Mutex<Option<InFlight>>,
}

impl<R: RunHelper> TokenCache<R> {
    /// `helper.refresh_skew_seconds` is expected to be validated (> 0) by the caller.
    pub fn new(runner: R, helper: HelperConfig) -> Self {
        let skew = helper.refresh_skew();
        Self {
            inner: Arc::new(Inner {
                runner,
                helper,
                skew,
                state: RwLock::new(TokenState::empty()),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn skew(&self) -> Duration {
        self.inner.skew
    }

    /// Snapshot of the cached state, fresh or not.
    pub fn current(&self) -> TokenState {
        self.inner.read_state().clone()
    }

    /// Cached token if `now + skew <= expiry`, otherwise the outcome of a refresh.
    ///
    /// The refresh runs on its own task: dropping this future stops the
    /// wait, not the refresh.
    pub async fn get_valid_token(&self, now: DateTime<Utc>) -> Result<TokenState, ProviderError> {
        let metrics = get_metrics().await;

        if let Some(state) = self.inner.fresh_state(now) {
            metrics.cache_hits.inc();
            return Ok(state);
        }

        let mut receiver = {
            let mut slot = self.inner.lock_in_flight();
            match slot.as_ref().filter(|rx| !is_abandoned(rx)) {
                Some(rx) => {
                    debug!("joining in-flight token refresh");
                    metrics.refresh_waiters_joined.inc();
                    rx.clone()
                }
                None => {
                    // a refresh may have landed between the read above and taking the slot
                    if let Some(state) = self.inner.fresh_state(now) {
                        metrics.cache_hits.inc();
                        return Ok(state);
                    }
                    let (sender, receiver) = watch::channel(None);
                    *slot = Some(receiver.clone());
                    tokio::spawn(refresh_task(self.inner.clone(), sender));
                    receiver
                }
            }
        };

        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            Err(ProviderError::Interrupted { executable: self.inner.helper.executable.clone() })
        })
    }
}

// sender gone without an outcome: the refresh task died (runtime shutdown)
fn is_abandoned(rx: &InFlight) -> bool {
    rx.has_changed().is_err() && rx.borrow().is_none()
}

async fn refresh_task<R: RunHelper>(
    inner: Arc<Inner<R>>,
    sender: watch::Sender<Option<RefreshOutcome>>,
) {
    let outcome = inner.refresh().await;
    {
        let mut slot = inner.lock_in_flight();
        if let Ok(state) = &outcome {
            *inner.write_state() = state.clone();
        }
        *slot = None;
    }
    sender.send_replace(Some(outcome));
}

impl<R: RunHelper> Inner<R> {
    fn fresh_state(&self, now: DateTime<Utc>) -> Option<TokenState> {
        let state = self.read_state();
        (!state.is_stale(now, self.skew)).then(|| state.clone())
    }

    async fn refresh(&self) -> RefreshOutcome {
        let metrics = get_metrics().await;
        let start = get_instant();
        let executable = self.helper.executable.as_str();

        info!(executable, "refreshing token via credential helper");
        metrics.helper_invocations.inc();

        let run = self.runner.run(executable, &self.helper.args);
        let outcome = match self.helper.timeout() {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => self.translate(result),
                Err(_) => Err(ProviderError::Timeout {
                    executable: executable.to_owned(),
                    seconds: limit.as_secs(),
                }),
            },
            None => {
                let result = run.await;
                self.translate(result)
            }
        };

        metrics.refresh_duration.observe(start.elapsed().as_secs_f64());
        match &outcome {
            Ok(state) => {
                metrics.token_expiry_unix.set(state.expiry.timestamp());
                info!(executable, expiry = %state.expiry, "token refreshed");
            }
            Err(err) => {
                metrics.helper_failures.with_label_values(&[err.reason()]).inc();
                warn!(executable, reason = err.reason(), "token refresh failed: {}", err);
            }
        }
        outcome
    }

    fn translate(&self, result: Result<HelperOutput, LaunchError>) -> RefreshOutcome {
        let output = match result {
            Ok(output) if output.success() => output,
            Ok(output) => return Err(self.helper_failed(output.exit_code, output.stdout, output.stderr, None)),
            Err(launch) => return Err(self.helper_failed(None, String::new(), String::new(), Some(launch))),
        };

        let credential = parse_credential(output.stdout.as_bytes())?;
        Ok(TokenState::new(credential.access_token, credential.expiry))
    }

    fn helper_failed(
        &self,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        launch: Option<LaunchError>,
    ) -> ProviderError {
        let credentials_var_name = self.helper.credentials_env_var.clone();
        ProviderError::HelperFailed {
            executable: self.helper.executable.clone(),
            exit_code,
            credentials_var: std::env::var_os(&credentials_var_name)
                .map(|value| value.to_string_lossy().into_owned()),
            credentials_var_name,
            stdout,
            stderr,
            launch,
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, TokenState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, TokenState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
