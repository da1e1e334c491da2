//! Span helpers shared by the database and agent crates.
//!
//! The macros follow OpenTelemetry semantic conventions so the spans line up
//! with the exporter configured by the server binary.

use tracing::Span;

/// Create a span for a SQL statement sent to the configured database.
///
/// # Example
/// ```ignore
/// let span = db_query_span!("sqlite", "SELECT");
/// async {
///     // run the statement
/// }.instrument(span).await;
/// ```
#[macro_export]
macro_rules! db_query_span {
    ($system:expr, $operation:expr) => {
        $crate::tracing::info_span!(
            "db.query",
            db.system = $system,
            db.operation = $operation,
            db.rows = $crate::tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = $crate::tracing::field::Empty,
            error.message = $crate::tracing::field::Empty
        )
    };
}

/// Create a span for a request to the hosted language model.
///
/// # Example
/// ```ignore
/// let span = llm_call_span!("openai", "gpt-3.5-turbo");
/// ```
#[macro_export]
macro_rules! llm_call_span {
    ($provider:expr, $model:expr) => {
        $crate::tracing::info_span!(
            "llm.call",
            llm.provider = $provider,
            llm.model = $model,
            http.status_code = $crate::tracing::field::Empty,
            llm.tool_calls = $crate::tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = $crate::tracing::field::Empty,
            error.message = $crate::tracing::field::Empty
        )
    };
}

/// Record a successful operation on the current span
pub fn record_success() {
    Span::current().record("otel.status_code", "OK");
}

/// Record a failed operation on the current span with an error message
pub fn record_error(message: &str) {
    let span = Span::current();
    span.record("otel.status_code", "ERROR");
    span.record("error.message", message);
}

/// Record HTTP status code on the current span
pub fn record_http_status(status: u16) {
    let span = Span::current();
    span.record("http.status_code", status);
    if status >= 400 {
        span.record("otel.status_code", "ERROR");
    } else {
        span.record("otel.status_code", "OK");
    }
}
