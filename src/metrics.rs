use async_trait::async_trait;
use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use shipwreck_agent::llm::{AssistantReply, ChatMessage, ChatModel, LlmError, ToolDefinition};
use shipwreck_config::ObservabilityConfig;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Whether metrics are recorded. Falls back to `OBSERVABILITY_ENABLED`
/// when [`init_metrics`] has not run.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| ObservabilityConfig::from_env().enabled)
}

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Model round-trips are slow; agent runs take several of them.
const LLM_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0];

/// Install the Prometheus recorder and its upkeep task.
///
/// Returns `Ok(None)` when observability is disabled.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>, BuildError> {
    let _ = OBSERVABILITY_ENABLED.set(config.enabled);
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("sql_execution_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("llm_request_duration_seconds".to_string()),
            LLM_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("agent_run_duration_seconds".to_string()),
            LLM_BUCKETS,
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Metrics middleware to track HTTP requests
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status.to_string()).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    let status_category = match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    counter!("http_requests_by_status", "status_category" => status_category).increment(1);

    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router for metrics server
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// `outcome` is one of `success`, `no_tool_call`, `malformed_tool_call`,
/// `iteration_limit` or `model_error`.
pub fn track_agent_run(outcome: &'static str, duration_secs: f64, iterations: usize) {
    if !is_observability_enabled() {
        return;
    }
    counter!("agent_runs_total", "outcome" => outcome).increment(1);
    histogram!("agent_run_duration_seconds").record(duration_secs);
    if iterations > 0 {
        histogram!("agent_iterations").record(iterations as f64);
    }
}

pub fn track_sql_execution(success: bool, duration_secs: f64) {
    if !is_observability_enabled() {
        return;
    }
    let status = if success { "success" } else { "error" };
    counter!("sql_executions_total", "status" => status).increment(1);
    histogram!("sql_execution_duration_seconds").record(duration_secs);
}

fn track_llm_request(model: &str, status: &'static str, duration_secs: f64) {
    if !is_observability_enabled() {
        return;
    }
    counter!("llm_requests_total", "model" => model.to_string(), "status" => status).increment(1);
    histogram!("llm_request_duration_seconds", "model" => model.to_string()).record(duration_secs);
}

/// Wraps a [`ChatModel`] and records request counts and latency.
pub struct MeteredChatModel {
    inner: Arc<dyn ChatModel>,
}

impl MeteredChatModel {
    pub fn new(inner: Arc<dyn ChatModel>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatModel for MeteredChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, LlmError> {
        let start = Instant::now();
        let result = self.inner.complete(messages, tools).await;
        let status = match &result {
            Ok(_) => "success",
            Err(LlmError::Api { .. }) => "api_error",
            Err(LlmError::Transport(_)) => "transport_error",
            Err(_) => "invalid_response",
        };
        track_llm_request(self.inner.model_name(), status, start.elapsed().as_secs_f64());
        result
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
