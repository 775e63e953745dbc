//! Question answering pipeline
//!
//! The pieces of a single prediction:
//! - Question splitting (bare question vs. options block)
//! - Web search for source URLs
//! - Page fetching and visible-text extraction
//! - Prompt rendering
//! - Model invocation and structured-output parsing
//! - Response assembly

mod extract;
mod fetch;
mod llm;
mod models;
mod processor;
mod prompt;
mod question;
mod search;
mod user_agent;

#[cfg(test)]
mod test_server;

pub use extract::visible_text;
pub use fetch::{ContentAggregator, HttpPageFetcher, PageFetcher, SOURCE_SEPARATOR};
pub use llm::{parse_agent_response, strip_code_fences, ChatModel, ModelInvoker, OpenAIChatClient};
pub use models::{AgentResponse, PredictionRequest, PredictionResponse, RequestId};
pub use processor::{assemble_response, signature, ProcessorOptions, QueryProcessor};
pub use prompt::build_prompt;
pub use question::{ParsedQuery, OPTIONS_DELIMITER};
pub use search::{parse_result_links, DuckDuckGoSearch, WebSearch};
pub use user_agent::random_user_agent;
