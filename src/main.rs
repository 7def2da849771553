use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use terabox_relay_bot::config::Config;
use terabox_relay_bot::pipeline::Pipeline;
use terabox_relay_bot::relay::staging;
use terabox_relay_bot::{bot, health};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    init_tracing()?;

    info!("Starting terabox-relay-bot");

    // Load and validate configuration; a missing BOT_TOKEN stops here
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        base_url = %config.terabox_base_url,
        work_dir = %config.work_dir.display(),
        "Configuration loaded"
    );

    // Ensure the staging directory exists and is clean
    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create work directory: {}",
                config.work_dir.display()
            )
        })?;

    match staging::sweep_stale(&config.work_dir).await {
        Ok(0) => {}
        Ok(removed) => info!(removed, "Removed stale staged files"),
        Err(e) => warn!("Failed to sweep work directory: {e:#}"),
    }

    let pipeline = Arc::new(Pipeline::new(&config).context("Failed to initialize pipeline")?);

    if let Some(api_url) = &config.telegram_api_url {
        info!(api_url = %api_url, "Using custom Bot API server");
    }
    let telegram = bot::build_bot(&config)?;

    // Start keep-alive endpoint in background
    let health_handle = config.health_port.map(|port| {
        tokio::spawn(async move {
            if let Err(e) = health::serve(port).await {
                error!("Keep-alive server error: {e:#}");
            }
        })
    });

    info!("Bot started");

    // Run until the dispatcher exits or a shutdown signal arrives
    tokio::select! {
        () = bot::run(telegram, pipeline) => warn!("Dispatcher stopped"),
        () = shutdown_signal() => info!("Shutting down..."),
    }

    if let Some(handle) = health_handle {
        handle.abort();
    }

    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,terabox_relay_bot=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        // Pretty-printed logging for development
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and never fires, so the bot keeps running.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
