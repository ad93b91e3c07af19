use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bingx_stream::{StreamConfig, new_bingx_client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = StreamConfig::from_env().context("loading stream configuration")?;
    info!(channels = config.channels.len(), "configuration loaded");

    let client = new_bingx_client(config, |update| {
        info!(symbol = update.symbol(), price = update.price(), "{}", update.kind());
    });

    client.connect().await.context("connecting to BingX")?;

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutting down");

    client.close().await?;
    let stats = client.stats();
    info!(
        frames = stats.frames_received,
        updates = stats.price_updates,
        reconnects = stats.reconnects,
        "stream closed"
    );

    Ok(())
}
