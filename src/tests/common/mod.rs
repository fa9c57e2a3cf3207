// tests/common/mod.rs
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::config::helper::HelperConfig;
use crate::error::LaunchError;
use crate::helper::{HelperOutput, RunHelper};

type Respond = dyn Fn(usize) -> Result<HelperOutput, LaunchError> + Send + Sync;

/// In-memory helper: counts invocations, optionally slow, answers from a closure.
#[derive(Clone)]
pub struct ScriptedRunner {
    calls: Arc<AtomicUsize>,
    seen_args: Arc<Mutex<Vec<Vec<String>>>>,
    delay: Duration,
    respond: Arc<Respond>,
}

impl ScriptedRunner {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize) -> Result<HelperOutput, LaunchError> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            seen_args: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
            respond: Arc::new(respond),
        }
    }

    /// Always prints a credential for `token` expiring at `expiry`.
    pub fn issuing(token: &str, expiry: DateTime<Utc>) -> Self {
        let stdout = credential_json(token, expiry);
        Self::new(move |_| Ok(exited(0, &stdout, "")))
    }

    /// Always exits with `code` and `stderr`.
    pub fn failing(code: i32, stderr: &str) -> Self {
        let stderr = stderr.to_owned();
        Self::new(move |_| Ok(exited(code, "", &stderr)))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle that keeps counting after the runner moves into a provider.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn seen_args(&self) -> Vec<Vec<String>> {
        self.seen_args.lock().unwrap().clone()
    }
}

impl RunHelper for ScriptedRunner {
    async fn run(&self, _executable: &str, args: &[String]) -> Result<HelperOutput, LaunchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_args.lock().unwrap().push(args.to_vec());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.respond)(n)
    }
}

pub fn exited(code: i32, stdout: &str, stderr: &str) -> HelperOutput {
    HelperOutput { exit_code: Some(code), stdout: stdout.to_owned(), stderr: stderr.to_owned() }
}

/// Shape printed by `gcloud config config-helper --format=json`.
pub fn credential_json(token: &str, expiry: DateTime<Utc>) -> String {
    json!({
        "configuration": {"active_configuration": "default"},
        "credential": {
            "access_token": token,
            "token_expiry": expiry.to_rfc3339(),
        },
    })
    .to_string()
}

pub fn helper_config() -> HelperConfig {
    HelperConfig::new("gcloud")
}

/// Run a shell script through `/bin/sh`, keeping the default helper arguments after it.
#[cfg(unix)]
pub fn script_helper_config(dir: &tempfile::TempDir, body: &str) -> HelperConfig {
    let path = dir.path().join("helper.sh");
    std::fs::write(&path, body).expect("write helper script");

    let mut cfg = HelperConfig::new("/bin/sh");
    let mut args = vec![path.to_string_lossy().into_owned()];
    args.extend(cfg.args.drain(..));
    cfg.args = args;
    cfg
}

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
