//! Chat model client and structured-output parsing

use super::models::AgentResponse;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for single-turn chat completion
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a system instruction and a user message, return the reply text
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat completions client
pub struct OpenAIChatClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

impl OpenAIChatClient {
    /// Create a new client for `base_url` (e.g. `https://api.openai.com/v1`)
    pub fn new(api_key: String, base_url: &str, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Model {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Model {
                message: format!("API error {}: {}", status, body),
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| AppError::Model {
            message: format!("Failed to parse response: {}", e),
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Model {
                message: "Empty response from model".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Remove markdown code-fence markers around a JSON reply
pub fn strip_code_fences(reply: &str) -> String {
    reply
        .trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Decode a raw model reply into an [`AgentResponse`]
pub fn parse_agent_response(reply: &str) -> Result<AgentResponse> {
    serde_json::from_str(&strip_code_fences(reply)).map_err(|e| AppError::ModelOutput {
        message: e.to_string(),
    })
}

/// Calls the model and decodes its reply, retrying both as one unit
pub struct ModelInvoker {
    model: Arc<dyn ChatModel>,
    system_instruction: String,
    retry: RetryPolicy,
}

impl ModelInvoker {
    pub fn new(model: Arc<dyn ChatModel>, system_instruction: String, retry: RetryPolicy) -> Self {
        Self {
            model,
            system_instruction,
            retry,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Ask the model and parse its structured answer
    ///
    /// A reply that is not the expected JSON counts as a failed attempt.
    pub async fn invoke(&self, prompt: &str) -> Result<AgentResponse> {
        let model = self.model.as_ref();
        let system = self.system_instruction.as_str();
        let start = Instant::now();

        let result = self
            .retry
            .run("query_model", move || async move {
                let reply = model.complete(system, prompt).await?;
                tracing::debug!(model = model.model_name(), reply = %reply, "Model reply");
                parse_agent_response(&reply)
            })
            .await;

        metrics::record_model(
            start.elapsed().as_secs_f64(),
            self.model_name(),
            result.is_ok(),
        );
        result
    }
}
