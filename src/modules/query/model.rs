use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use shipwreck_agent::{ConversationTurn, TurnRole};
use shipwreck_db::JsonRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const MAX_QUERY_CHARS: u64 = 4000;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("query must not be blank")));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QueryRequest {
    /// Question about student billing data, in plain language
    #[validate(
        custom(function = "not_blank"),
        length(max = MAX_QUERY_CHARS, message = "query must be at most 4000 characters")
    )]
    #[schema(example = "What was undergraduate tuition revenue by term?")]
    pub query: String,
    /// Earlier turns of the conversation, oldest first
    #[serde(default)]
    #[validate(length(max = 50, message = "history must have at most 50 turns"))]
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    Human,
    Ai,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HistoryTurn {
    pub role: HistoryRole,
    pub content: String,
}

impl From<HistoryTurn> for ConversationTurn {
    fn from(turn: HistoryTurn) -> Self {
        let role = match turn.role {
            HistoryRole::Human => TurnRole::Human,
            HistoryRole::Ai => TurnRole::Ai,
        };
        ConversationTurn {
            role,
            content: turn.content,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    /// Rows returned by the generated SQL, one object per row keyed by column name
    #[schema(value_type = Vec<Object>)]
    pub output: Vec<JsonRow>,
    /// The SQL statement that produced `output`
    #[schema(example = "SELECT t.code AS term_code FROM Term t")]
    pub query: String,
    /// The model's short answer
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
