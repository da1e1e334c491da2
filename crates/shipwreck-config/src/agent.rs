//! Agent loop configuration.
//!
//! # Environment Variables
//!
//! - `AGENT_TOP_K`: rows shown to the model per query observation (default: 1000)
//! - `AGENT_MAX_ITERATIONS`: model round-trips before giving up (default: 15)
//! - `AGENT_HANDLE_PARSING_ERRORS`: feed malformed replies back to the model (default: true)
//! - `AGENT_SCHEMA_TOOLS`: offer the list-tables and schema tools (default: false)
//! - `AGENT_VERBOSE`: log every intermediate step at info level (default: true)

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    pub top_k: usize,
    pub max_iterations: usize,
    pub handle_parsing_errors: bool,
    pub schema_tools: bool,
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            top_k: 1000,
            max_iterations: 15,
            handle_parsing_errors: true,
            schema_tools: false,
            verbose: true,
        }
    }
}

impl AgentConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(crate::env_lookup)
    }

    #[must_use]
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            top_k: crate::parse_or(&lookup, "AGENT_TOP_K", defaults.top_k).max(1),
            max_iterations: crate::parse_or(&lookup, "AGENT_MAX_ITERATIONS", defaults.max_iterations)
                .max(1),
            handle_parsing_errors: crate::flag_or(
                &lookup,
                "AGENT_HANDLE_PARSING_ERRORS",
                defaults.handle_parsing_errors,
            ),
            schema_tools: crate::flag_or(&lookup, "AGENT_SCHEMA_TOOLS", defaults.schema_tools),
            verbose: crate::flag_or(&lookup, "AGENT_VERBOSE", defaults.verbose),
        }
    }
}
