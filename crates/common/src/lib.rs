//! AnswerForge Common Library
//!
//! Shared code for AnswerForge services including:
//! - The question answering pipeline
//! - Retry policy for outbound calls
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod agent;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod retry;

// Re-export commonly used types
pub use agent::{PredictionRequest, PredictionResponse, QueryProcessor};
pub use config::Settings;
pub use errors::{AppError, Result};
pub use retry::RetryPolicy;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
