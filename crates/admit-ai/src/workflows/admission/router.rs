use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{AdmissionId, EvaluationSubmission};
use super::repository::{AlertPublisher, ConfigStore, EvaluationRepository, RepositoryError};
use super::service::{AdmissionEvaluationService, EvaluationError};

/// Router builder exposing HTTP endpoints for evaluation and lookup.
pub fn admission_router<S, R, A>(service: Arc<AdmissionEvaluationService<S, R, A>>) -> Router
where
    S: ConfigStore + 'static,
    R: EvaluationRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/admissions/evaluations",
            post(evaluate_handler::<S, R, A>),
        )
        .route(
            "/api/v1/admissions/evaluations/:admission_id",
            get(status_handler::<S, R, A>),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler<S, R, A>(
    State(service): State<Arc<AdmissionEvaluationService<S, R, A>>>,
    axum::Json(submission): axum::Json<EvaluationSubmission>,
) -> Response
where
    S: ConfigStore + 'static,
    R: EvaluationRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.evaluate(submission.features, submission.request) {
        Ok(outcome) => (StatusCode::CREATED, axum::Json(outcome)).into_response(),
        Err(EvaluationError::Validation(error)) => {
            let payload = json!({
                "error": error.to_string(),
                "kind": "validation",
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(EvaluationError::Configuration(error)) => {
            let payload = json!({
                "error": error.to_string(),
                "kind": "configuration",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<S, R, A>(
    State(service): State<Arc<AdmissionEvaluationService<S, R, A>>>,
    Path(admission_id): Path<String>,
) -> Response
where
    S: ConfigStore + 'static,
    R: EvaluationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let id = AdmissionId(admission_id);
    match service.get(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(EvaluationError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "admission_id": id.0,
                "error": "evaluation not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
