use std::time::Instant;

use shipwreck_agent::{AgentError, ConversationTurn, SqlAgent};
use shipwreck_core::AppError;
use shipwreck_db::{Database, DbError};
use tracing::{info, warn};

use crate::metrics::{track_agent_run, track_sql_execution};
use crate::modules::query::model::QueryResponse;

pub struct QueryService;

impl QueryService {
    /// Let the agent pick a statement for `question`, then run it in full.
    ///
    /// The agent only sees the first `top_k` rows of each query; `output`
    /// carries every row of the final statement.
    pub async fn answer(
        agent: &SqlAgent,
        db: &Database,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<QueryResponse, AppError> {
        let started = Instant::now();
        let outcome = match agent.run(question, history).await {
            Ok(outcome) => {
                track_agent_run("success", started.elapsed().as_secs_f64(), outcome.iterations);
                outcome
            }
            Err(e) => {
                track_agent_run(agent_error_label(&e), started.elapsed().as_secs_f64(), 0);
                return Err(agent_error_to_app_error(e));
            }
        };

        let executed = Instant::now();
        let rows = db.fetch_rows(&outcome.query).await;
        track_sql_execution(rows.is_ok(), executed.elapsed().as_secs_f64());
        let output = rows.map_err(db_error_to_app_error)?;

        info!(
            rows = output.len(),
            steps = outcome.steps.len(),
            sql = %outcome.query,
            "Query answered"
        );

        Ok(QueryResponse {
            output,
            query: outcome.query,
            content: outcome.content,
        })
    }
}

fn agent_error_label(err: &AgentError) -> &'static str {
    match err {
        AgentError::Model(_) => "model_error",
        AgentError::NoToolCall => "no_tool_call",
        AgentError::MalformedToolCall(_) => "malformed_tool_call",
        AgentError::IterationLimit(_) => "iteration_limit",
    }
}

fn agent_error_to_app_error(err: AgentError) -> AppError {
    match err {
        AgentError::Model(e) => {
            warn!(error = %e, "Language model request failed");
            AppError::bad_gateway(e)
        }
        other => AppError::unprocessable(other),
    }
}

fn db_error_to_app_error(err: DbError) -> AppError {
    match err {
        DbError::Guard(e) => AppError::unprocessable(e),
        other => AppError::database(other),
    }
}
