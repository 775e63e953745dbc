//! Prometheus scrape endpoint

use axum::extract::State;
use crate::AppState;

/// Render all recorded metrics in the Prometheus text format
pub async fn render(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
