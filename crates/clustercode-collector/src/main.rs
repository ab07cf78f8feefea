mod args;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use clustercode_collector::config::load_fleet_config;
use clustercode_collector::metrics::router as metrics_router;
use clustercode_collector::{
    ChartRegistry, CollectorMetrics, FleetConfigurator, HttpTransport, PluginSink, TokioScheduler,
};
use clustercode_common::telemetry::init_tracing;

use crate::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let provider = init_tracing("clustercode-collector", args.otlp_endpoint.as_deref());

    let mut config = load_fleet_config(&args.config)?;
    if let Some(every) = args.update_every {
        config.update_every = Some(every);
    }
    tracing::info!(config=%args.config.display(), "clustercode-collector starting...");

    let metrics = Arc::new(CollectorMetrics::default());
    let sink = Arc::new(PluginSink::stdout());
    let registry = Arc::new(ChartRegistry::new(sink.clone(), metrics.clone()));
    let transport = Arc::new(HttpTransport::new(Duration::from_secs(args.http_timeout_secs)));
    let cancel = CancellationToken::new();
    let scheduler = Arc::new(TokioScheduler::new(cancel.clone()));

    let fleet = FleetConfigurator::new(registry, transport, scheduler.clone(), metrics.clone());
    let added = fleet.configure(&config);
    if added == 0 {
        tracing::warn!("no usable nodes configured, disabling");
        sink.disable()?;
        return Ok(());
    }
    tracing::info!(nodes = added, "fleet configured");

    if let Some(addr) = args.metrics_addr.as_deref() {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "serving collector metrics");
        let app = metrics_router(metrics.clone());
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move { cancel.cancelled().await })
                .await;
            if let Err(e) = served {
                tracing::warn!(error=%e, "metrics listener stopped");
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    scheduler.shutdown().await;

    if let Some(provider) = provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error=%e, "failed to flush traces");
        }
    }
    Ok(())
}
