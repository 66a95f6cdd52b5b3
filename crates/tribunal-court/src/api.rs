//! HTTP API for the court.
//!
//! Juror identity is supplied upstream in the `x-juror-id` header; the court
//! performs no authentication of its own.

use crate::error::{Error, ErrorClass};
use crate::history::HistoryEntry;
use crate::models::{AiAnalysis, Case, CaseReport, Vote};
use crate::service::{SubmitOutcome, Tribunal};
use crate::stats::JurorStats;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

type AppState = Arc<Tribunal>;

/// Header carrying the caller's juror id.
pub const JUROR_HEADER: &str = "x-juror-id";

/// Default and maximum queue page sizes.
pub const DEFAULT_QUEUE_LIMIT: usize = 10;
pub const MAX_QUEUE_LIMIT: usize = 100;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        // Report intake
        .route("/api/v1/cases", post(open_case))
        .route("/api/v1/cases/:id", get(get_case))
        .route("/api/v1/cases/:id/verdicts", post(submit_verdict))
        // Juror views
        .route("/api/v1/queue", get(fetch_queue))
        .route("/api/v1/stats", get(fetch_stats))
        .route("/api/v1/history", get(fetch_history))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// --- Errors ---

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    class: ErrorClass,
}

/// Court error rendered as a JSON response.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let class = self.0.class();
        let status = match class {
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Conflict => StatusCode::CONFLICT,
            ErrorClass::Forbidden => StatusCode::FORBIDDEN,
            ErrorClass::Validation => StatusCode::BAD_REQUEST,
            ErrorClass::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorClass::Internal => {
                tracing::error!("request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.0.to_string(),
            class,
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Unwrap a JSON body, reporting malformed input as a validation error.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError(Error::Validation(rejection.body_text())))
}

fn juror_id(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(JUROR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError(Error::Validation(format!("missing {} header", JUROR_HEADER))))
}

// --- Health endpoints ---

async fn health() -> &'static str {
    "OK"
}

// --- Case endpoints ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenCaseRequest {
    #[serde(flatten)]
    report: CaseReport,
    #[serde(default)]
    ai_analysis: AiAnalysis,
}

async fn open_case(
    State(court): State<AppState>,
    payload: std::result::Result<Json<OpenCaseRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Case>)> {
    let req = json_body(payload)?;
    let case = court.open_case(req.report, req.ai_analysis)?;
    Ok((StatusCode::CREATED, Json(case)))
}

async fn get_case(
    State(court): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Case>> {
    Ok(Json(court.get_case(&id)?))
}

#[derive(Debug, Deserialize)]
struct VerdictRequest {
    vote: String,
}

async fn submit_verdict(
    State(court): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: std::result::Result<Json<VerdictRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitOutcome>> {
    let juror = juror_id(&headers)?;
    let req = json_body(payload)?;
    let vote: Vote = req.vote.parse().map_err(Error::from)?;
    Ok(Json(court.submit_verdict(&juror, &id, vote)?))
}

// --- Juror endpoints ---

#[derive(Debug, Deserialize)]
struct QueueParams {
    limit: Option<usize>,
}

async fn fetch_queue(
    State(court): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QueueParams>,
) -> ApiResult<Json<Vec<Case>>> {
    let juror = juror_id(&headers)?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_QUEUE_LIMIT)
        .min(MAX_QUEUE_LIMIT);
    Ok(Json(court.fetch_case_queue(&juror, limit)?))
}

async fn fetch_stats(
    State(court): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<JurorStats>> {
    let juror = juror_id(&headers)?;
    Ok(Json(court.fetch_juror_stats(&juror)?))
}

async fn fetch_history(
    State(court): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let juror = juror_id(&headers)?;
    Ok(Json(court.fetch_juror_history(&juror)?))
}
