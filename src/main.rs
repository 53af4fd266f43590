// src/main.rs

use filecat::{menu, start_cataloging, Config, SqliteCatalog};
use anyhow::{Context, Result};
use std::env;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filecat=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: filecat <watch_dir> [db_path]");
            return Ok(());
        }
    };

    if !config.watch_dir.is_dir() {
        anyhow::bail!("Watch directory does not exist: {}", config.watch_dir.display());
    }

    tracing::info!("[Bootstrap] Watch directory: {}", config.watch_dir.display());
    tracing::info!("[Bootstrap] Scan interval: {:?}", config.scan_interval);

    // ========== INITIALIZE CATALOG ==========
    let catalog = SqliteCatalog::open(&config.db_path)
        .with_context(|| format!("Failed to open catalog at {}", config.db_path.display()))?;
    let catalog = Arc::new(Mutex::new(catalog));
    tracing::info!("[Bootstrap] ✓ Catalog ready: {}", config.db_path.display());

    // ========== CTRL+C: first stops monitoring, second exits ==========
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("[Bootstrap] Ctrl+C handler unavailable");
                return;
            }
            cancel.cancel();
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("[Bootstrap] Interrupted again, exiting");
                std::process::exit(130);
            }
        });
    }

    // ========== MONITOR ==========
    println!(
        "Monitoring directory {}... Press Ctrl+C to stop and access options.",
        config.watch_dir.display()
    );
    start_cataloging(catalog.clone(), &config.watch_dir, config.scan_interval, cancel).await;
    println!("\nMonitoring stopped. Entering options menu.");

    // ========== OPTIONS MENU ==========
    let result_set = config.result_set.clone();
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        menu::run_menu(&catalog, result_set, &mut stdin.lock(), &mut stdout.lock())
    })
    .await
    .context("Menu task failed")??;

    tracing::info!("[Bootstrap] filecat shutting down...");
    Ok(())
}
