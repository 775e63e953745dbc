//! Prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;

use crate::AppState;
use answerforge_common::{
    errors::{AppError, Result},
    metrics::RequestMetrics,
    PredictionRequest, PredictionResponse,
};

/// Answer one question with web sources
pub async fn predict(
    State(state): State<AppState>,
    body: std::result::Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    let start = Instant::now();
    let metrics = RequestMetrics::start("POST", "/request");

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            metrics.finish(400);
            return Err(AppError::Validation {
                message: rejection.body_text(),
            });
        }
    };
    let id = request.id.clone();

    let result = state.processor.process(request).await;

    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    };
    metrics.finish(status);

    let response = result?;
    tracing::info!(
        id = %id,
        answer = ?response.answer,
        sources = response.sources.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Prediction completed"
    );

    Ok(Json(response))
}
