//! Test doubles for code that drives a [`ChatModel`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{
    AssistantReply, ChatMessage, ChatModel, FunctionCall, LlmError, ToolCall, ToolDefinition,
};
use crate::tools::QUERY_TOOL;

/// Replays canned replies in order and records every request.
///
/// Once the script runs out, further calls fail with
/// [`LlmError::EmptyResponse`].
#[derive(Default)]
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<Result<AssistantReply, LlmError>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    offered_tools: Mutex<Vec<Vec<String>>>,
}

impl ScriptedChatModel {
    pub fn new(replies: impl IntoIterator<Item = AssistantReply>) -> Self {
        Self::with_results(replies.into_iter().map(Ok))
    }

    pub fn with_results(replies: impl IntoIterator<Item = Result<AssistantReply, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Message lists sent so far, one entry per call.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// Tool names offered on each call.
    pub fn offered_tools(&self) -> Vec<Vec<String>> {
        self.offered_tools.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, LlmError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.offered_tools
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.function.name.clone()).collect());

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// A reply holding a single tool call with raw JSON arguments.
pub fn tool_call(id: &str, name: &str, arguments: &str) -> AssistantReply {
    AssistantReply {
        content: None,
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }],
    }
}

/// A reply calling the query tool with `sql`.
pub fn query_call(id: &str, sql: &str) -> AssistantReply {
    let arguments = serde_json::json!({ "query": sql }).to_string();
    tool_call(id, QUERY_TOOL, &arguments)
}

/// A plain-text reply with no tool calls.
pub fn answer(text: &str) -> AssistantReply {
    AssistantReply {
        content: Some(text.to_string()),
        tool_calls: Vec::new(),
    }
}
