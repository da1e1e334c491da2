use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use shipwreck_config::LlmConfig;
use shipwreck_core::llm_call_span;
use shipwreck_core::spans::{record_error, record_http_status};
use tracing::{Instrument, Span, debug};

use super::{AssistantReply, ChatMessage, ChatModel, LlmError, ToolCall, ToolDefinition};

/// Error bodies are cut to this many characters before they reach logs or clients.
const MAX_ERROR_BODY: usize = 2000;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatModel {
    client: Client,
    endpoint: String,
    config: LlmConfig,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

impl OpenAiChatModel {
    /// # Errors
    ///
    /// Returns [`LlmError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, LlmError> {
        let span = llm_call_span!("openai", self.config.model.as_str());

        async move {
            let mut body = json!({
                "model": self.config.model,
                "temperature": self.config.temperature,
                "messages": messages,
            });
            if !tools.is_empty() {
                body["tools"] = json!(tools);
                body["tool_choice"] = json!("auto");
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await
                .inspect_err(|e| record_error(&e.to_string()))?;

            let status = response.status();
            record_http_status(status.as_u16());
            let text = response.text().await?;

            if !status.is_success() {
                let body: String = text.chars().take(MAX_ERROR_BODY).collect();
                record_error(&body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
            let choice = parsed
                .choices
                .into_iter()
                .next()
                .ok_or(LlmError::EmptyResponse)?;

            let tool_calls = choice.message.tool_calls.unwrap_or_default();
            Span::current().record("llm.tool_calls", tool_calls.len() as u64);
            debug!(
                tool_calls = tool_calls.len(),
                has_content = choice.message.content.is_some(),
                "Model replied"
            );

            Ok(AssistantReply {
                content: choice.message.content,
                tool_calls,
            })
        }
        .instrument(span)
        .await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
