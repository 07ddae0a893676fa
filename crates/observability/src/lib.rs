//! # Observability
//!
//! Tracing + Prometheus metrics for the tracker stream.
//!
//! ## Features
//!
//! - Tracing initialization (JSON/Pretty/Compact)
//! - Optional Prometheus exporter
//! - Send/receive metric recorders and an in-memory link summary
//!
//! ## Example
//!
//! ```ignore
//! use observability::{init_with_config, ObservabilityConfig};
//!
//! init_with_config(ObservabilityConfig::default())?;
//!
//! let report = sender.send_frame(&frame).await?;
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-exports
pub use crate::metrics::{
    record_frame_gap, record_frame_received, record_frame_rejected, record_frame_sent,
    record_send_failure, record_stale_frame, LinkStatsAggregator, LinkSummary, RunningStats,
    StatsSummary,
};

/// Initialize tracing with default settings
///
/// - Tracing: JSON, honours RUST_LOG, stream crates at `info`
/// - Prometheus: disabled
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// Filter used when RUST_LOG is unset: the stream crates log per-frame
/// detail at `debug`, so keep them at `info` and everything else at `warn`.
pub const DEFAULT_LOG_FILTER: &str = "warn,transport=info,frame_codec=info,config_loader=info";

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// EnvFilter directives used when RUST_LOG is unset
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Human-readable logs with per-datagram `debug` events from the
    /// sender and receiver, for watching a stream on a terminal
    pub fn debug_console() -> Self {
        Self {
            log_format: LogFormat::Compact,
            metrics_port: None,
            default_log_level: "info,transport=debug,frame_builder=trace".to_string(),
        }
    }

    pub fn with_metrics_port(mut self, port: u16) -> Self {
        self.metrics_port = Some(port);
        self
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON lines, one per event, with the enclosing send/receive span
    #[default]
    Json,
    /// Multi-line human-readable
    Pretty,
    /// Single line, no module targets
    Compact,
}

/// Install the tracing subscriber and, if configured, the Prometheus
/// exporter.
///
/// # Errors
/// Fails when a global subscriber or recorder is already installed, or
/// when the metrics port cannot be bound.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_log_level))
        .with_context(|| format!("Invalid log filter: {}", config.default_log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
    };
    installed.context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Tracker stream observability initialized"
    );

    Ok(())
}

/// Install only the Prometheus exporter
///
/// For hosts that already set up their own tracing subscriber.
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
