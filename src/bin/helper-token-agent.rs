use clap::Parser;
use anyhow::{Context, Result};
use helper_token_agent::executor::token_refresh::loop_refresh_token;
use helper_token_agent::provider::TokenProvider;
use helper_token_agent::resilience::retry::RetrySettings;
use helper_token_agent::server;
use helper_token_agent::utils::config_loader;
use helper_token_agent::utils::logging;
use helper_token_agent::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "helper-token-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
    /// print the Authorization value once and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;

    // -------------------------------
    // 2. Build provider
    // -------------------------------

    let provider = TokenProvider::new(service_config.helper.clone())?;

    if args.once {
        let header = provider.authorization_value().await?;
        let value = header.to_str().context("authorization value is not printable")?;
        println!("{}", value);
        return Ok(());
    }

    // -------------------------------
    // 3. Keep the token warm, serve it over http
    // -------------------------------

    let retry = RetrySettings::from_config(&service_config.settings.retry);
    let refresher = loop_refresh_token(provider.clone(), retry);
    let http_server = server::server::start(&service_config.settings, provider);

    info!("Service starting...");
    tokio::select! {
        result = async { tokio::try_join!(refresher, http_server) } => { result?; }
        _ = tokio::signal::ctrl_c() => { info!("shutdown requested"); }
    }

    Ok(())
}
