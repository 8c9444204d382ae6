//! Main entry point for the Activity Relay bootstrap
//!
//! Validates the relay configuration, prints the startup banner and,
//! optionally, provisions the task queue to check the broker is usable.
//! Exits non-zero on the first configuration or connectivity error.

use activity_relay::config::{EnvSettings, FileSettings, LayeredSettings};
use activity_relay::queue::{provision, BrokerFactory};
use activity_relay::store::RedisConnector;
use activity_relay::{RelayConfig, VERSION};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Activity Relay - configuration check and task queue provisioning
#[derive(Parser)]
#[command(
    name = "activity-relay",
    version,
    about = "Validate ActivityPub relay configuration and provision its task queue",
    long_about = "Reads relay settings from the environment (optionally layered over a TOML \
                 settings file), validates them, verifies the cache store is reachable and \
                 prints the resulting configuration."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to settings file (TOML format); environment variables take precedence"
    )]
    config: Option<PathBuf>,

    /// Log level
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error); RUST_LOG takes precedence"
    )]
    log_level: String,

    /// Also provision the task queue
    #[arg(long, help = "Connect to the broker and declare the relay task queue")]
    provision: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Environment first, then the settings file if one was given
fn load_settings(args: &Args) -> Result<LayeredSettings> {
    let mut settings = LayeredSettings::new().with_layer(EnvSettings);

    if let Some(path) = &args.config {
        info!("Loading settings from: {}", path.display());
        let file = FileSettings::from_file(path)
            .with_context(|| format!("Failed to load settings file {}", path.display()))?;
        settings = settings.with_layer(file);
    }

    Ok(settings)
}

async fn run(args: Args) -> Result<()> {
    let settings = load_settings(&args)?;

    let config = RelayConfig::build(&settings, &RedisConnector)
        .await
        .context("Invalid relay configuration")?;

    for line in config.dump_welcome_message("bootstrap", VERSION).lines() {
        info!("{}", line);
    }

    if args.provision {
        let client = provision(&config, &BrokerFactory)
            .await
            .context("Failed to provision task queue")?;
        info!(
            "Task queue '{}' ready on exchange '{}'",
            client.settings().default_queue,
            client.settings().exchange
        );
        client.close().await.context("Failed to close task queue")?;
    }

    info!("Configuration check completed");
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
