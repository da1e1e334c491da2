//! # Shipwreck Core
//!
//! Foundational types shared by every Shipwreck crate:
//!
//! - [`errors`]: [`AppError`], the error type handlers return, with HTTP response conversion
//! - [`spans`]: span constructors and recorders for model calls and SQL execution
//!
//! # Example
//!
//! ```ignore
//! use shipwreck_core::AppError;
//!
//! let error = AppError::unprocessable(anyhow::anyhow!("model produced no SQL"));
//! ```

pub mod errors;
pub mod spans;

pub use errors::AppError;

// Re-exported so the span macros resolve `tracing` from any caller crate.
#[doc(hidden)]
pub use tracing;
