//! Query Processor - answers one prediction request end to end
//!
//! Split question → web search → fetch sources → prompt → model → response.
//! Search and model failures fail the request; individual source pages
//! that cannot be fetched are skipped.

use super::fetch::{ContentAggregator, HttpPageFetcher, PageFetcher};
use super::llm::{ChatModel, ModelInvoker, OpenAIChatClient};
use super::models::{AgentResponse, PredictionRequest, PredictionResponse, RequestId};
use super::prompt::build_prompt;
use super::question::ParsedQuery;
use super::search::{DuckDuckGoSearch, WebSearch};
use crate::config::Settings;
use crate::errors::Result;
use crate::metrics;
use crate::retry::RetryPolicy;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Signature line appended to every reasoning
pub fn signature(model_name: &str) -> String {
    format!("\nОтвет сформирован с использованием модели {}", model_name)
}

/// Tunables for [`QueryProcessor`]
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    pub system_instruction: String,
    /// Search hits used as sources
    pub max_sources: usize,
    pub fetch_retry: RetryPolicy,
    pub model_retry: RetryPolicy,
}

impl ProcessorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            system_instruction: settings.system_instruction.clone(),
            max_sources: settings.search_max_results,
            fetch_retry: RetryPolicy::default(),
            model_retry: RetryPolicy::default(),
        }
    }
}

/// The request-processing pipeline
pub struct QueryProcessor {
    search: Arc<dyn WebSearch>,
    aggregator: ContentAggregator,
    invoker: ModelInvoker,
    max_sources: usize,
}

impl QueryProcessor {
    pub fn new(
        search: Arc<dyn WebSearch>,
        fetcher: Arc<dyn PageFetcher>,
        model: Arc<dyn ChatModel>,
        options: ProcessorOptions,
    ) -> Self {
        Self {
            search,
            aggregator: ContentAggregator::new(fetcher, options.fetch_retry),
            invoker: ModelInvoker::new(model, options.system_instruction, options.model_retry),
            max_sources: options.max_sources.max(1),
        }
    }

    /// Build the production pipeline from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let search = DuckDuckGoSearch::new(&settings.search_endpoint, settings.fetch_timeout())?;
        let fetcher = HttpPageFetcher::new(settings.fetch_timeout())?;
        let model = OpenAIChatClient::new(
            settings.openai_api_key.clone(),
            &settings.openai_endpoint,
            settings.openai_model_name.clone(),
            settings.llm_timeout(),
        )?;

        Ok(Self::new(
            Arc::new(search),
            Arc::new(fetcher),
            Arc::new(model),
            ProcessorOptions::from_settings(settings),
        ))
    }

    pub fn model_name(&self) -> &str {
        self.invoker.model_name()
    }

    /// Answer a single request
    pub async fn process(&self, request: PredictionRequest) -> Result<PredictionResponse> {
        let parsed = ParsedQuery::parse(&request.query);
        debug!(
            id = %request.id,
            query = %request.query,
            question = parsed.question,
            options = parsed.options,
            "Processing query"
        );

        let sources = self.find_sources(parsed.question).await?;
        debug!(id = %request.id, sources = ?sources, "Found sources");

        let web_content = self.aggregator.aggregate(&sources).await;
        let prompt = build_prompt(parsed.question, parsed.options, &web_content);

        let output = self.invoker.invoke(&prompt).await?;
        debug!(id = %request.id, output = ?output, "Model output");

        let response = assemble_response(
            request.id,
            parsed.has_options(),
            output,
            sources,
            self.model_name(),
        );
        debug!(response = ?response, "Final response");
        Ok(response)
    }

    async fn find_sources(&self, question: &str) -> Result<Vec<String>> {
        let start = Instant::now();
        let result = self.search.search(question, self.max_sources).await;
        metrics::record_search(
            start.elapsed().as_secs_f64(),
            self.search.name(),
            result.is_ok(),
        );
        result
    }
}

/// Combine the model output with the request id and discovered sources
///
/// Open questions never carry an answer, whatever the model said.
pub fn assemble_response(
    id: RequestId,
    has_options: bool,
    output: AgentResponse,
    sources: Vec<String>,
    model_name: &str,
) -> PredictionResponse {
    PredictionResponse {
        id,
        answer: if has_options { output.answer } else { None },
        reasoning: output.reasoning + &signature(model_name),
        sources,
    }
}
