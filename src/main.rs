mod config;
mod error;
mod intent;
mod platform;
mod profiles;
mod registrar;
mod registry;
mod relay;
mod reply;
mod router;
mod scheduler;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::platform::telegram::TelegramPlatform;
use crate::registry::Registry;
use crate::relay::AppContext;
use crate::scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so RUST_LOG from it reaches the filter
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,botrelay=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A fault nobody handled leaves the relay in an unknown state; stop.
    std::panic::set_hook(Box::new(|panic| {
        error!("Uncaught fault: {}", panic);
        std::process::exit(1);
    }));

    info!("Starting webhook relay...");

    // Fatal configuration problems exit with code 1 before any socket opens
    let config = Config::from_env().inspect_err(|e| error!("{}", e))?;
    let registry = Registry::initialize(&config).inspect_err(|e| error!("{}", e))?;

    info!("Configuration loaded successfully");
    info!("  Bind address: {}", config.bind_address());
    info!(
        "  Webhook URL: {}",
        config.webhook_url.as_deref().unwrap_or("(not set)")
    );
    info!("  Ask delay: {:?}", config.ask_delay);

    let platform = Arc::new(TelegramPlatform::new(&registry)?);

    let mut scheduler = Scheduler::new().await?;
    scheduler.start().await?;

    let results = registrar::register_all(
        registry.identities(),
        platform.as_ref(),
        config.webhook_url.as_deref(),
    )
    .await;
    for result in &results {
        info!("  Webhook {}: {}", result.identity, result.outcome);
    }
    let registered = results.iter().filter(|r| r.succeeded()).count();
    info!("Webhooks registered: {}/{}", registered, results.len());

    let ctx = Arc::new(AppContext {
        registry,
        platform,
        scheduler: Arc::new(scheduler.clone()),
        ask_delay: config.ask_delay,
    });
    let app = server::build_router(ctx, config.port);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Pending deferred replies are dropped here
    scheduler.shutdown().await?;
    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received SIGINT, shutting down...");
}
