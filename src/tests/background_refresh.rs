#[cfg(test)]
mod test {
    use std::sync::atomic::Ordering;
    use std::time::Duration as StdDuration;

    use chrono::{Duration, Utc};

    use crate::executor::token_refresh::loop_refresh_token;
    use crate::provider::TokenProvider;
    use crate::resilience::retry::RetrySettings;
    use crate::tests::common::{credential_json, exited, helper_config, ScriptedRunner};

    fn quick_retry() -> RetrySettings {
        RetrySettings { attempts: 2, base_delay_ms: 10, max_delay_ms: 20 }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn refreshes_ahead_of_expiry() {
        // 31s lifetime against a 30s skew: due again one second after each fetch
        let runner = ScriptedRunner::new(|n| {
            let stdout = credential_json(&format!("T{n}"), Utc::now() + Duration::seconds(31));
            Ok(exited(0, &stdout, ""))
        });
        let calls = runner.counter();
        let provider = TokenProvider::with_runner(runner, helper_config()).unwrap();

        let task = tokio::spawn(loop_refresh_token(provider.clone(), quick_retry()));
        tokio::time::sleep(StdDuration::from_millis(3500)).await;
        task.abort();

        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert!(provider.cache().current().access_token.starts_with('T'));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn keeps_running_after_helper_failures() {
        let runner = ScriptedRunner::failing(1, "no active account");
        let calls = runner.counter();
        let provider = TokenProvider::with_runner(runner, helper_config()).unwrap();

        let task = tokio::spawn(loop_refresh_token(provider, quick_retry()));
        tokio::time::sleep(StdDuration::from_millis(500)).await;

        assert!(!task.is_finished());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        task.abort();
    }
}
