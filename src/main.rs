//! nickguard - Straylight nickname protection services node
//!
//! Links to a TS6 network as a services server and enforces ownership of
//! registered nicknames.

use slirc_nickguard::config::{Config, LogFormat, validate};
use slirc_nickguard::db::Database;
use slirc_nickguard::link;
use slirc_nickguard::services::NickGuard;
use slirc_nickguard::state::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "nickguard.toml".to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            error!(path = %config_path, error = %e, "Failed to load config");
            return Err(e.into());
        }
    };
    init_tracing(config.logging.format);

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {}",
            errors.len(),
            config_path
        ));
    }

    info!(
        server = %config.server.name,
        sid = %config.server.sid,
        uplink = %config.link.address,
        "Starting nickguard"
    );

    // Initialize database
    let db = Database::new(&config.database.path).await?;

    let guard = Arc::new(NickGuard::new(
        config.protection.clone(),
        &config.server.sid,
        Arc::new(db),
        Arc::new(SystemClock),
    ));
    let reconnect_delay = Duration::from_secs(config.link.reconnect_delay);

    loop {
        tokio::select! {
            result = link::run(&config, guard.clone()) => {
                if let Err(e) = result {
                    warn!(error = %e, "Uplink lost");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }

        info!(delay_secs = reconnect_delay.as_secs(), "Reconnecting to uplink");
        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    guard.stop();
    Ok(())
}
