//! The tool-calling loop that turns a question into one SQL statement.
//!
//! Each round sends the conversation to the model. A tool call is executed
//! and its observation appended; a plain reply ends the run once a query
//! has succeeded. Malformed replies are fed back as corrections when
//! `handle_parsing_errors` is on.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use shipwreck_config::AgentConfig;
use shipwreck_db::Database;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::llm::{ChatMessage, ChatModel, LlmError};
use crate::prompt::{ConversationTurn, PromptContext, render_prompt};
use crate::tools::{QUERY_TOOL, SqlToolbox, ToolCallError, parse_call};

pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

const MISSING_TOOL_CALL: &str = "Invalid reply: you must call the sql_db_query tool exactly once \
     with a JSON object of the form {\"query\": \"<SQL>\"}. Do not answer in plain text.";

const EXTRA_TOOL_CALL: &str = "Error: exactly one tool call is allowed";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("the model answered without calling the SQL tool")]
    NoToolCall,

    #[error("the model sent a malformed tool call: {0}")]
    MalformedToolCall(String),

    #[error("no SQL query succeeded within {0} iterations")]
    IterationLimit(usize),
}

/// One executed tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub input: Value,
    pub observation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutcome {
    /// Last query that executed without error, normalized.
    pub query: String,
    /// The model's final answer text.
    pub content: String,
    pub steps: Vec<AgentStep>,
    pub iterations: usize,
}

pub struct SqlAgent {
    model: Arc<dyn ChatModel>,
    toolbox: SqlToolbox,
    config: AgentConfig,
}

impl SqlAgent {
    pub fn new(model: Arc<dyn ChatModel>, db: Database, config: AgentConfig) -> Self {
        let toolbox = SqlToolbox::new(db, config.top_k, config.schema_tools);
        Self {
            model,
            toolbox,
            config,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn database(&self) -> &Database {
        self.toolbox.database()
    }

    /// Ask the model for SQL answering `question` and run it.
    ///
    /// # Errors
    ///
    /// Model failures, a reply that never calls the tool (when parsing
    /// errors are not handled), or no successful query within
    /// `max_iterations`.
    #[instrument(skip_all, fields(model = %self.model.model_name()))]
    pub async fn run(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<AgentOutcome, AgentError> {
        let prompt = render_prompt(&PromptContext {
            question,
            history,
            dialect: self.toolbox.database().dialect(),
        });
        let tools = self.toolbox.definitions();
        let mut messages = vec![ChatMessage::system(prompt), ChatMessage::user(question.trim())];
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut last_query: Option<String> = None;

        for iteration in 1..=self.config.max_iterations {
            let reply = self.model.complete(&messages, &tools).await?;

            if reply.tool_calls.is_empty() {
                if let Some(query) = last_query {
                    debug!(iteration, steps = steps.len(), "Agent finished");
                    return Ok(AgentOutcome {
                        query,
                        content: reply.content.unwrap_or_default(),
                        steps,
                        iterations: iteration,
                    });
                }
                if !self.config.handle_parsing_errors {
                    return Err(AgentError::NoToolCall);
                }
                warn!(iteration, "Model replied without a tool call");
                messages.push(reply.into_message());
                messages.push(ChatMessage::user(MISSING_TOOL_CALL));
                continue;
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply.into_message());

            for (index, call) in calls.iter().enumerate() {
                if index > 0 {
                    messages.push(ChatMessage::tool(&call.id, EXTRA_TOOL_CALL));
                    continue;
                }

                let observation = match parse_call(call, self.toolbox.schema_tools()) {
                    Ok(invocation) => {
                        let observation = self.toolbox.run(&invocation).await;
                        if let Some(sql) = observation.executed_sql {
                            last_query = Some(sql);
                        }
                        let step = AgentStep {
                            tool: invocation.tool_name().to_string(),
                            input: invocation.input(),
                            observation: observation.text,
                        };
                        self.log_step(iteration, &step);
                        let text = step.observation.clone();
                        steps.push(step);
                        text
                    }
                    Err(e @ ToolCallError::UnknownTool(_)) => format!("Error: {e}"),
                    Err(e @ ToolCallError::MalformedArguments { .. }) => {
                        if !self.config.handle_parsing_errors {
                            return Err(AgentError::MalformedToolCall(e.to_string()));
                        }
                        warn!(iteration, error = %e, "Malformed tool call");
                        format!("Error: {e}. Call {QUERY_TOOL} with {{\"query\": \"<SQL>\"}}.")
                    }
                };

                messages.push(ChatMessage::tool(&call.id, observation));
            }
        }

        match last_query {
            Some(query) => {
                warn!(
                    max_iterations = self.config.max_iterations,
                    "Agent hit the iteration limit after a successful query"
                );
                Ok(AgentOutcome {
                    query,
                    content: ITERATION_LIMIT_MESSAGE.to_string(),
                    steps,
                    iterations: self.config.max_iterations,
                })
            }
            None => Err(AgentError::IterationLimit(self.config.max_iterations)),
        }
    }

    fn log_step(&self, iteration: usize, step: &AgentStep) {
        if self.config.verbose {
            info!(iteration, tool = %step.tool, input = %step.input, observation = %step.observation, "Agent step");
        } else {
            debug!(iteration, tool = %step.tool, "Agent step");
        }
    }
}
