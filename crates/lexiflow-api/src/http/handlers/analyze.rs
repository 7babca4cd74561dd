//! Word-level text analysis handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use lexiflow_core::analysis::TextAnalyzer;
use lexiflow_core::workflow::builtin::DEFAULT_MAX_CANDIDATES;

use crate::http::extractors::json::ApiJson;
use crate::http::response::AnalyzeResponse;
use crate::state::AppState;

/// Upper bound on candidates a caller may ask for.
pub const MAX_CANDIDATES_LIMIT: usize = 200;

/// Body of `POST /analyze`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    pub language: String,
    pub max_candidates: Option<usize>,
}

/// Run both analyzer passes over one text.
pub fn analyze_text(analyzer: &TextAnalyzer, request: AnalyzeRequest) -> (StatusCode, AnalyzeResponse) {
    let max_candidates = request
        .max_candidates
        .unwrap_or(DEFAULT_MAX_CANDIDATES)
        .clamp(1, MAX_CANDIDATES_LIMIT);

    let words = analyzer.analyze(&request.text, &request.language);
    let candidates = analyzer.extract_candidates(&request.text, &request.language, max_candidates);

    match (words, candidates) {
        (Ok(words), Ok(candidates)) => (
            StatusCode::OK,
            AnalyzeResponse {
                success: true,
                words,
                candidates,
                raw_text: request.text,
                error: None,
            },
        ),
        (Err(e), _) | (_, Err(e)) => (
            StatusCode::BAD_REQUEST,
            AnalyzeResponse::failure(request.text, e.to_string()),
        ),
    }
}

/// POST /analyze - Per-token breakdown plus ranked candidates.
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> (StatusCode, Json<AnalyzeResponse>) {
    let (status, body) = analyze_text(&state.analyzer, request);
    (status, Json(body))
}
