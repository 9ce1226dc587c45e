use std::sync::OnceLock;

use anyhow::{Context, Result};
use kskill_core::Payload;
use tracing::Span;
use tracing::field;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TelemetryConfig;

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber once. Later calls are no-ops, as is losing the race against
/// a subscriber installed elsewhere.
pub fn init_telemetry(cfg: TelemetryConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_new(&cfg.filter)
        .with_context(|| format!("invalid log filter `{}`", cfg.filter))?;

    let fmt_layer = if cfg.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok();

    INIT.set(()).ok();
    tracing::info!(
        service.name = %cfg.service_name,
        service.version = %cfg.service_version,
        deployment.environment = %cfg.environment,
        "telemetry initialised"
    );
    Ok(())
}

pub fn telemetry_initialized() -> bool {
    INIT.get().is_some()
}

/// Span covering the handling of one skill request.
pub fn request_span(payload: &Payload) -> Span {
    let span = tracing::info_span!(
        "skill.request",
        bot_id = field::Empty,
        user_id = field::Empty,
        block_id = field::Empty
    );
    with_common_fields(
        &span,
        &payload.bot.id,
        Some(payload.user_id()),
        payload
            .user_request
            .block
            .get("id")
            .and_then(|id| id.as_str()),
    );
    span
}

/// Records the request identifiers on `span`, skipping empty ones.
pub fn with_common_fields(span: &Span, bot_id: &str, user_id: Option<&str>, block_id: Option<&str>) {
    if !bot_id.is_empty() {
        span.record("bot_id", field::display(bot_id));
    }
    if let Some(user_id) = user_id.filter(|id| !id.is_empty()) {
        span.record("user_id", field::display(user_id));
    }
    if let Some(block_id) = block_id.filter(|id| !id.is_empty()) {
        span.record("block_id", field::display(block_id));
    }
}
