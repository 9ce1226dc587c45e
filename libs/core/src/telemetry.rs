use tracing::field;

use crate::error::Result;

const RENDER_SPAN_NAME: &str = "skill.render";
const RENDER_COUNTER: &str = "kakao_skill_rendered";
const REJECT_COUNTER: &str = "kakao_skill_rejected";

/// Runs a top-level render inside a tracing span and records the outcome.
///
/// `kind` names the envelope being produced (`skill_response`, `event_api`, ...).
pub fn render_with_span<T, F>(kind: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let span = tracing::info_span!(RENDER_SPAN_NAME, kind = kind, outcome = field::Empty);
    let _guard = span.enter();
    let result = f();
    match &result {
        Ok(_) => {
            span.record("outcome", "ok");
            metrics::counter!(RENDER_COUNTER, "kind" => kind).increment(1);
        }
        Err(err) => {
            span.record("outcome", err.kind());
            tracing::debug!(error.kind = err.kind(), error = %err, "render rejected");
            metrics::counter!(REJECT_COUNTER, "kind" => kind, "error" => err.kind()).increment(1);
        }
    }
    result
}
