use anyhow::{anyhow, Result};
use axum::Router;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::helper::RunHelper;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::provider::TokenProvider;
use crate::server::token_route;

pub struct AppState<R: RunHelper> {
    pub metrics_state: MetricsState,
    pub provider: TokenProvider<R>,
}

impl<R: RunHelper> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self { metrics_state: self.metrics_state.clone(), provider: self.provider.clone() }
    }
}

impl<R: RunHelper> AppState<R> {
    pub fn new(metrics: &Metrics, provider: TokenProvider<R>) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            provider,
        }
    }
}

/// Token, health and (when enabled) metrics routes.
pub fn router<R: RunHelper>(state: AppState<R>, settings_config: &SettingsConfig) -> Router {
    Router::new()
        .merge(token_route::router::<R>())
        .merge(state.metrics_state.router::<R>(&settings_config.metrics))
        .with_state(state)
}

/// Serve until the process is stopped.
pub async fn start<R: RunHelper>(settings_config: &SettingsConfig, provider: TokenProvider<R>) -> Result<()> {
    let metrics = get_metrics().await;
    let app = router(AppState::new(metrics, provider), settings_config);

    let address = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow!("cannot bind {}: {}", address, e))?;
    info!("serving on {}", address);

    metrics.up.set(1);
    axum::serve(listener, app).await?;
    Ok(())
}
