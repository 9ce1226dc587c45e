//! Tracing bootstrap for Kakao skill servers.
//! The core crate only emits spans and events; this crate decides where they go.

use anyhow::Result;

mod config;
mod tracing_init;

pub use config::TelemetryConfig;
pub use tracing_init::{init_telemetry, request_span, telemetry_initialized, with_common_fields};

/// Installs the subscriber configured from `RUST_LOG`, `LOG_FORMAT` and `SERVICE_NAME`.
pub fn install(service_name: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(
        service_name,
        env!("CARGO_PKG_VERSION"),
    ))
}
