//! Configuration validation with aggregated errors.

use tracing::{error, info};

use crate::config::helper::HelperConfig;
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::config::ServiceConfig;
use crate::observability::metrics::get_metrics;

/// Returns Ok(()) or every issue found.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_helper(&cfg.helper, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config validation: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_helper(helper: &HelperConfig, errors: &mut Vec<String>) {
    if helper.executable.trim().is_empty() {
        errors.push("helper.executable must not be empty".to_string());
    }
    if helper.refresh_skew_seconds == 0 {
        errors.push("helper.refresh_skew_seconds must be greater than 0".to_string());
    }
    if helper.timeout_seconds == Some(0) {
        errors.push("helper.timeout_seconds must be greater than 0 when set".to_string());
    }
    if helper.credentials_env_var.trim().is_empty() {
        errors.push("helper.credentials_env_var must not be empty".to_string());
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be a valid port number",
            settings.server.port
        ));
    }

    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_retry(prefix: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == Some(0) {
        errors.push(format!("{}.attempts must be >= 1", prefix));
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                prefix, max, base
            ));
        }
    }
}
