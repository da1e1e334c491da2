//! # Shipwreck Agent
//!
//! Turns a natural-language question into one SQL query by prompting a
//! hosted language model with the student-billing rulebook and letting it
//! call the `sql_db_query` tool.
//!
//! - [`llm`]: chat message types, the [`llm::ChatModel`] trait and the OpenAI client
//! - [`prompt`]: the rulebook prompt and conversation history rendering
//! - [`tools`]: tool definitions offered to the model and their execution
//! - [`executor`]: the agent loop, [`SqlAgent`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shipwreck_agent::{SqlAgent, llm::OpenAiChatModel};
//!
//! let model = Arc::new(OpenAiChatModel::new(LlmConfig::from_env()?)?);
//! let agent = SqlAgent::new(model, db, AgentConfig::from_env());
//! let outcome = agent.run("tuition revenue by term for undergrads", &[]).await?;
//! println!("{}", outcome.query);
//! ```

pub mod executor;
pub mod llm;
pub mod prompt;
pub mod tools;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use executor::{AgentError, AgentOutcome, AgentStep, SqlAgent};
pub use prompt::{ConversationTurn, TurnRole};
