use std::sync::Arc;

use anyhow::{Context, Result};
use geocoding::Mapbox;
use nearby_transit::{Config, Provider, router};
use onebusaway::OneBusAway;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    Registry::default().with(filter).with(fmt::layer()).init();

    let config = Config::from_env();
    let http = Arc::new(Provider::new());

    let transit = OneBusAway::new(Arc::clone(&http), config.onebusaway_base_url.clone())
        .api_key(config.onebusaway_api_key.clone())
        .timeout(config.upstream_timeout);
    let geocoder = Mapbox::new(http, config.mapbox_base_url.clone())
        .token(config.mapbox_token.clone())
        .proximity(config.geocoding_proximity)
        .timeout(config.upstream_timeout);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, router(Arc::new(transit), Arc::new(geocoder)))
        .with_graceful_shutdown(shutdown())
        .await
        .context("serving")
}

async fn shutdown() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
