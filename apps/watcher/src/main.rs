mod config;
mod main_lib;
mod scheduler;

use config::Config;
use main_lib::{build_watcher, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let watcher = build_watcher(&config)?;
    tracing::info!("Watching {}", config.listing_url);

    scheduler::run_watch_loop(&watcher, config.interval, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;
    Ok(())
}
