//! Logging and OpenTelemetry initialization for the payments server
//!
//! Every log line is emitted inside the `http_request` span opened by the
//! request-id middleware, so request and correlation ids travel with it. Output
//! goes to stdout as text or JSON, optionally also to a rolling file, and spans
//! are exported over OTLP when enabled. `RUST_LOG` overrides the configured
//! level.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{Sampler, TracerProvider},
    Resource,
};
use std::time::Duration;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const TRACER_NAME: &str = "finatech-server";

/// Keeps the log file writer alive and flushes spans on drop.
///
/// Hold it in `main` until the server has shut down.
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// A failing OTLP exporter is not fatal: the server keeps logging locally and
/// a warning is emitted once the subscriber is up. Calling this twice in one
/// process is an error.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<TelemetryGuard> {
    let (tracer_provider, otel_init_error) = if config.opentelemetry_enabled {
        match init_tracer_provider(config) {
            Ok(provider) => (Some(provider), None),
            Err(e) => (None, Some(e.to_string())),
        }
    } else {
        (None, None)
    };

    let otel_layer = tracer_provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer()
            .with_tracer(provider.tracer(TRACER_NAME))
            .with_tracked_inactivity(true)
    });

    let (file_writer, file_guard) = if config.file_enabled {
        let (writer, guard) = create_file_writer(config)?;
        (Some(writer), Some(guard))
    } else {
        (None, None)
    };

    let registry = tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(otel_layer);

    // Files never get ANSI colours; stdout keeps the fmt default.
    if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stdout),
            )
            .with(file_writer.map(|writer| {
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(writer)
            }))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stdout),
            )
            .with(file_writer.map(|writer| {
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(writer)
            }))
            .try_init()?;
    }

    if let Some(provider) = tracer_provider {
        global::set_tracer_provider(provider);
    }

    if let Some(err) = otel_init_error {
        tracing::warn!(
            error = %err,
            endpoint = %config.otlp_endpoint,
            "OpenTelemetry exporter unavailable, continuing with local logs only"
        );
    }

    tracing::info!(
        otel_enabled = config.opentelemetry_enabled,
        json = config.json,
        file_enabled = config.file_enabled,
        service_name = %config.service_name,
        environment = %config.deployment_environment,
        "Logging initialized"
    );

    Ok(TelemetryGuard {
        _file_guard: file_guard,
    })
}

fn build_resource(config: &LoggingConfig) -> Resource {
    let service_version = config
        .service_version
        .clone()
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.namespace", "finatech"),
        KeyValue::new("service.version", service_version),
        KeyValue::new(
            "deployment.environment",
            config.deployment_environment.clone(),
        ),
    ])
}

fn init_tracer_provider(config: &LoggingConfig) -> anyhow::Result<TracerProvider> {
    use opentelemetry_sdk::trace::Config;

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(&config.otlp_endpoint)
        .with_timeout(Duration::from_secs(config.otlp_timeout_seconds))
        .build_span_exporter()
        .map_err(|e| anyhow::anyhow!("Failed to create OTLP exporter: {}", e))?;

    let trace_config = Config::default()
        .with_sampler(sampler_for(config.trace_sample_ratio))
        .with_resource(build_resource(config));

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_config(trace_config)
        .build())
}

fn sampler_for(ratio: f64) -> Sampler {
    if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        // respect the parent's decision, sample new roots by ratio
        Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(ratio)))
    }
}

/// Targets at the configured level. sqlx statement logging is noisy and may
/// echo bound IBANs, so it stays at warn unless `RUST_LOG` says otherwise.
fn default_filter(level: &str) -> String {
    format!(
        "finatech_server={level},finatech={level},finatech_models={level},tower_http=debug,sqlx=warn"
    )
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)))
}

/// Rotation for a `logging.file_rotation` value.
pub fn rotation_for(name: &str) -> Option<Rotation> {
    match name {
        "daily" => Some(Rotation::DAILY),
        "hourly" => Some(Rotation::HOURLY),
        "minutely" => Some(Rotation::MINUTELY),
        "never" => Some(Rotation::NEVER),
        _ => None,
    }
}

fn create_file_writer(config: &LoggingConfig) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let rotation = rotation_for(&config.file_rotation).ok_or_else(|| {
        anyhow::anyhow!("unknown logging.file_rotation '{}'", config.file_rotation)
    })?;

    std::fs::create_dir_all(&config.file_directory)?;
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(&config.file_directory)?;

    Ok(tracing_appender::non_blocking(appender))
}

/// Flush and shut down the global tracer provider.
pub fn shutdown_telemetry() {
    global::shutdown_tracer_provider();
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        shutdown_telemetry();
    }
}
