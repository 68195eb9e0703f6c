mod cli;

use std::future::Future;

use clap::Parser;
use ouflow_rs::config::Settings;
use ouflow_rs::engine::Trader;
use ouflow_rs::execution::DryRunGateway;
use ouflow_rs::market_data::adapters::binance::BinanceDepthAdapter;
use ouflow_rs::market_data::adapters::replay::ReplayAdapter;
use ouflow_rs::market_data::router;
use ouflow_rs::telemetry;
use tokio::sync::watch;
use tracing::{info, warn};

use cli::Cli;

// Flip the shutdown flag when `signal` fires; the router lets an in-flight order finish first.
// If the hook cannot be installed the sender is parked so trading carries on.
fn spawn_shutdown_listener<F>(signal: F) -> watch::Receiver<bool>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                info!("received Ctrl+C");
                let _ = tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for Ctrl+C, running without a shutdown hook");
                std::future::pending::<()>().await;
                drop(tx);
            }
        }
    });
    rx
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref(), cli.overrides())?;

    telemetry::init_tracing(&settings.telemetry.log_filter);
    telemetry::init_metrics(&settings.telemetry.metrics_listen)?;

    info!(
        symbol = %settings.trader.symbol,
        window = settings.trader.window,
        threshold = settings.trader.threshold,
        dt = settings.trader.dt,
        theta = settings.trader.theta,
        qty = settings.trader.qty,
        normalization = settings.trader.normalization.as_str(),
        "starting"
    );

    let trader = Trader::new(settings.trader.clone())?;
    // Orders are acknowledged locally; no exchange credentials are used.
    let gateway = DryRunGateway::new();
    let shutdown = spawn_shutdown_listener(tokio::signal::ctrl_c());
    let capacity = settings.feed.channel_capacity;

    let summary = match cli.replay.as_deref() {
        Some(path) => {
            let adapter = ReplayAdapter::open(&settings.trader.symbol, path).await?;
            router::run(adapter, trader, gateway, capacity, shutdown).await?
        }
        None => {
            let adapter = BinanceDepthAdapter::new(&settings.trader.symbol, &settings.feed);
            router::run(adapter, trader, gateway, capacity, shutdown).await?
        }
    };

    info!(?summary, "exiting");
    Ok(())
}
