use std::sync::Arc;
use clap::Parser;
use crate::dashboard::config::{self, Config};
use crate::dashboard::prettylog::{log_snapshot_report, log_startup_banner};
use crate::dashboard::Args;
use crate::http::server;
use crate::loader::{DataLoader, Poller};
use crate::utils;

pub async fn run_dashboard() {
    let args = Args::parse();

    if let Err(e) = utils::init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
        return;
    }

    let config = match config::resolve(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let loader = match DataLoader::from_config(&config.loader) {
        Ok(loader) => Arc::new(loader),
        Err(e) => {
            tracing::error!("Failed to create loader: {}", e);
            std::process::exit(1);
        }
    };

    if args.once {
        run_once(&loader).await;
        return;
    }

    log_startup_banner(&config);
    run_polling(loader, &config).await;
}

/// Single cycle, snapshot JSON on stdout
async fn run_once(loader: &DataLoader) {
    let snapshot = match loader.load_all().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Load failed: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(snapshot.as_ref()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("Failed to serialize snapshot: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_polling(loader: Arc<DataLoader>, config: &Config) {
    // Initial load before the first interval elapses
    match loader.load_all().await {
        Ok(snapshot) => log_snapshot_report(&snapshot),
        Err(e) => tracing::error!("Initial load failed: {}", e),
    }

    // Start HTTP server if port is specified
    if let Some(port) = config.http.port {
        let cache = loader.cache();
        let bind = config.http.bind.clone();
        tokio::spawn(async move {
            if let Err(e) = server::start(&bind, port, cache).await {
                tracing::error!("HTTP server error: {}", e);
            }
        });
    }

    let poller = Poller::from_config(loader, &config.loader)
        .start_auto_refresh(|snapshot| log_snapshot_report(&snapshot));

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
    poller.stop().await;
}
