//! Request, response and model-output types

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque request identifier, echoed back unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Text(s) => f.write_str(s),
        }
    }
}

/// Inbound question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub id: RequestId,
    /// Raw query text, possibly followed by an enumerated options block
    pub query: String,
}

/// Outbound answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub id: RequestId,
    /// Chosen option; always `null` for open questions
    pub answer: Option<String>,
    pub reasoning: String,
    /// URLs found by the web search, whether or not they could be fetched
    pub sources: Vec<String>,
}

/// Structured reply expected from the model
///
/// Both fields must be present; `answer` may be `null`. Any other fields
/// in the reply are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentResponse {
    #[serde(deserialize_with = "answer_token")]
    pub answer: Option<String>,
    pub reasoning: String,
}

/// Accepts `"2"`, `2` or `null`
fn answer_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Integer(i64),
        Text(String),
    }

    Ok(Option::<Token>::deserialize(deserializer)?.map(|token| match token {
        Token::Integer(n) => n.to_string(),
        Token::Text(s) => s,
    }))
}
