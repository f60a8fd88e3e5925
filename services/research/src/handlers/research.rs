//! Research Handlers
//!
//! Batch price research for structured items or free-text order lines.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use std::time::Duration;
use tracing::info;

use wiretronic_models::{ResearchPayload, ResearchRequest, ResearchResponse, TextResearchRequest};
use wiretronic_utils::{parse_lines, resolve_api_key, validate_model, WiretronicError};

use crate::middleware::ApiResult;
use crate::upstream::DEFAULT_PROMPT;
use crate::AppState;

/// Research a list of items
///
/// POST /api/v1/research
pub async fn research(
    State(state): State<AppState>,
    body: Result<Json<ResearchRequest>, JsonRejection>,
) -> ApiResult<Json<ResearchResponse>> {
    let Json(request) = body?;

    let api_key = resolve_api_key(request.api_key.as_deref(), state.config.openai.api_key.as_deref())?;
    validate_model(&request)?;

    let payloads: Vec<ResearchPayload> = request
        .items
        .into_iter()
        .map(|item| item.into_payload(DEFAULT_PROMPT))
        .collect();

    run_research(&state, payloads, &api_key).await
}

/// Research free-text order lines, one part per line
///
/// POST /api/v1/research/text
pub async fn research_text(
    State(state): State<AppState>,
    body: Result<Json<TextResearchRequest>, JsonRejection>,
) -> ApiResult<Json<ResearchResponse>> {
    let Json(request) = body?;

    let api_key = resolve_api_key(request.api_key.as_deref(), state.config.openai.api_key.as_deref())?;

    let items = parse_lines(&request.text);
    if items.is_empty() {
        return Err(WiretronicError::validation("text", "No items to process").into());
    }

    let payloads = request.payloads(items, DEFAULT_PROMPT);
    run_research(&state, payloads, &api_key).await
}

async fn run_research(
    state: &AppState,
    payloads: Vec<ResearchPayload>,
    api_key: &str,
) -> ApiResult<Json<ResearchResponse>> {
    let ceiling = Duration::from_secs(state.config.research.request_timeout_seconds);
    info!(items = payloads.len(), "Research batch started");

    let results = state
        .service
        .run_chunked(&payloads, api_key, state.config.research.max_parallel, ceiling)
        .await;

    let failed = results.iter().filter(|result| !result.is_success()).count();
    info!(items = results.len(), failed, "Research batch finished");

    Ok(Json(ResearchResponse { results }))
}
