use opentelemetry::trace::TracerProvider as TracerProviderTrait;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber for a collector process.
///
/// The host reads the chart protocol from our stdout and appends whatever
/// we print on stderr to its own error log, so log lines go to stderr
/// without colour codes. Filtering follows `RUST_LOG` and defaults to
/// `info`.
///
/// With `otlp_endpoint` set, spans (one per poll) are also exported over
/// OTLP/HTTP. If the exporter cannot be built the collector keeps running
/// with stderr logging only and says so once. The returned provider must be
/// shut down before exit to flush pending spans.
pub fn init_tracing(service_name: &str, otlp_endpoint: Option<&str>) -> Option<TracerProvider> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut export_error = None;
    let provider = otlp_endpoint.and_then(|endpoint| match span_provider(service_name, endpoint) {
        Ok(provider) => Some(provider),
        Err(e) => {
            export_error = Some(e);
            None
        }
    });
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(service_name.to_string())));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(otel_layer)
        .init();

    match (otlp_endpoint, export_error) {
        (Some(endpoint), Some(error)) => {
            tracing::warn!(endpoint, %error, "OTLP exporter unavailable, logging to stderr only")
        }
        (Some(endpoint), None) => tracing::info!(endpoint, service_name, "OTLP tracing enabled"),
        _ => {}
    }
    provider
}

fn span_provider(service_name: &str, endpoint: &str) -> Result<TracerProvider, String> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| e.to_string())?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(Resource::new([KeyValue::new("service.name", service_name.to_string())]))
        .build())
}
