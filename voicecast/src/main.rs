#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::{net::SocketAddr, path::Path, sync::Arc};

use args::{Args, Command};
use clap::Parser;
use synthesis::Handler;
use tokio_util::sync::CancellationToken;
use voicecast_config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    voicecast_telemetry::init(&config.telemetry)?;

    tracing::info!(
        config_path = args.config.as_ref().map(|path| path.display().to_string()),
        "starting voicecast"
    );

    let handler = synthesis::build_handler(&config).await?;

    match args.command {
        Command::Serve { listen } => serve(handler, &config, listen).await?,
        Command::Invoke { payload } => invoke(&handler, &payload).await?,
    }

    tracing::info!("voicecast stopped");
    Ok(())
}

/// Serve the job endpoint until a shutdown signal arrives
async fn serve(handler: Arc<Handler>, config: &Config, listen: Option<SocketAddr>) -> anyhow::Result<()> {
    let listen_address = listen.unwrap_or_else(|| config.server.listen_address());
    let router = synthesis::app_router(handler, &config.server);

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    let listener = tokio::net::TcpListener::bind(listen_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "job endpoint listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        })
        .await?;

    Ok(())
}

/// Run one job event from a file and print its result
async fn invoke(handler: &Handler, payload: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(payload)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read payload {}: {e}", payload.display()))?;

    let event: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("payload is not valid JSON: {e}"))?;

    let result = handler.handle(&event).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
