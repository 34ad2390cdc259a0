use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use licitacoes_core::{
    adapters::config::{app_config::AppConfig, server_config::TelemetryConfig},
    prettyprint::prettyprint::PrettyFormatter,
};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info, instrument};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod http_adapter;
mod response;
mod routes;
mod service_factory;

use service_factory::ServiceFactory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::load().map_err(|report| format!("{:?}", report))?;

    setup_tracing(&config.telemetry)?;
    setup_panic_hook();

    let result = run(config).await;
    if let Err(e) = &result {
        error!("Server stopped with an error: {}", e);
    }

    opentelemetry::global::shutdown_tracer_provider();
    result
}

#[instrument(skip(config))]
async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.server.socket_addr()?;
    let adapter = Arc::new(ServiceFactory::create(&config).map_err(|report| format!("{:?}", report))?);

    let make_service = make_service_fn(move |_conn| {
        let adapter = Arc::clone(&adapter);
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                let adapter = Arc::clone(&adapter);
                async move { Ok::<_, Infallible>(adapter.serve(request).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)?.serve(make_service);
    info!(
        "Listening on http://{} (routes under '{}')",
        addr, config.server.base_path
    );

    server
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await?;

    Ok(())
}

/// Resolves once `signal` fires. If the handler could not be installed, never resolves,
/// so the server keeps running instead of stopping right after it starts.
async fn shutdown_signal<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            error!("Failed to listen for the shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}

fn setup_tracing(telemetry: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let level: tracing::Level = telemetry
        .level
        .parse()
        .map_err(|_| format!("Invalid telemetry.level '{}'", telemetry.level))?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    let log_file_layer = match telemetry.log_file() {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(false))
                .with_writer(std::fs::File::create(path)?)
                .with_ansi(false),
        ),
        None => None,
    };

    let otel_layer = match telemetry.otlp_endpoint() {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "licitacoes_server"),
                ])))
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;

            Some(OpenTelemetryLayer::new(tracer))
        }
        None => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("licitacoes_server", level)
                .with_target("licitacoes_core", level),
        )
        .with(otel_layer)
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_signal_resolves_when_signalled() {
        let shutdown = shutdown_signal(async { Ok(()) });
        assert!(tokio::time::timeout(Duration::from_millis(100), shutdown)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_signal_waits_forever_when_handler_fails() {
        let shutdown = shutdown_signal(async {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no signal handler"))
        });
        assert!(tokio::time::timeout(Duration::from_millis(100), shutdown)
            .await
            .is_err());
    }
}
