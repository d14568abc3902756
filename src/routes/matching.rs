use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{MatchingError, MatchingOrchestrator};
use crate::models::{ErrorResponse, HealthResponse, MatchingRequestBody, MatchingResponse};
use crate::services::PostgresClient;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<MatchingOrchestrator<PostgresClient, PostgresClient>>,
    pub default_preset: String,
    pub default_top_n: usize,
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matching", web::post().to(run_matching));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let check = state.orchestrator.loader().health_check();
    let pg_healthy = tokio::time::timeout(HEALTH_CHECK_TIMEOUT, check)
        .await
        .ok()
        .and_then(Result::ok)
        .unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn error_response(e: &MatchingError) -> HttpResponse {
    let body = ErrorResponse {
        error: e.code().to_string(),
        message: e.to_string(),
        status_code: if e.is_configuration() { 400 } else { 500 },
    };
    if e.is_configuration() {
        HttpResponse::BadRequest().json(body)
    } else {
        HttpResponse::InternalServerError().json(body)
    }
}

/// Rank candidates for one requester intent
///
/// POST /api/v1/matching
///
/// Request body:
/// ```json
/// {
///   "requesterId": "string",
///   "intentId": "string",
///   "settingsPreset": "default",
///   "topN": 20
/// }
/// ```
async fn run_matching(
    state: web::Data<AppState>,
    req: web::Json<MatchingRequestBody>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!(
            requester_id = %req.requester_id,
            "Validation failed for matching request: {}",
            errors
        );
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_error".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let request = req
        .into_inner()
        .into_request(&state.default_preset, state.default_top_n);

    match state.orchestrator.run(&request).await {
        Ok(result) => HttpResponse::Ok().json(MatchingResponse {
            result_id: result.id,
            ranked_candidate_ids: result.ranked_ids().to_vec(),
        }),
        Err(e) => error_response(&e),
    }
}
