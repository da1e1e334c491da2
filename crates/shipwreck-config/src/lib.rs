//! # Shipwreck Config
//!
//! Configuration types for the Shipwreck query service.
//!
//! Every structure is loaded from environment variables through `from_env()`.
//! `from_vars()` takes the lookup as a closure so callers (and tests) can
//! supply values without touching the process environment.
//!
//! - [`agent`]: agent loop limits and tool exposure
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: connection string and pool size
//! - [`llm`]: hosted language model credentials and sampling settings
//! - [`observability`]: log directory, OpenTelemetry endpoint, metrics switch
//! - [`server`]: listen addresses
//!
//! # Example
//!
//! ```ignore
//! use shipwreck_config::{CorsConfig, DatabaseConfig, LlmConfig};
//!
//! let cors_config = CorsConfig::from_env();
//! let database_config = DatabaseConfig::from_env();
//! let llm_config = LlmConfig::from_env()?;
//! ```

pub mod agent;
pub mod cors;
pub mod database;
pub mod error;
pub mod llm;
pub mod observability;
pub mod server;

// Re-export commonly used types at crate root
pub use agent::AgentConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use llm::LlmConfig;
pub use observability::ObservabilityConfig;
pub use server::ServerConfig;

pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn flag_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            let v = v.trim().to_lowercase();
            v != "false" && v != "0" && v != "no" && v != "off"
        })
        .unwrap_or(default)
}

pub(crate) fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
