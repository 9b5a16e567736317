use std::ops::RangeInclusive;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::PropositionId;
use super::errors::ErrorKind;
use super::ports::{CandidateProfileTranslator, EnrollmentCalendar, TrainingTranslator};
use super::repository::{PropositionRepository, PropositionStatusView, RepositoryError};
use super::resolver::SubmittedChoice;
use super::service::{AdmissionService, AdmissionServiceError, SubmissionRequest};

type SharedService<R, P, T, C> = Arc<AdmissionService<R, P, T, C>>;

/// Academic years accepted in the `annee` query parameter.
const QUERY_YEARS: RangeInclusive<i32> = 1900..=9999;

/// Router builder exposing pool determination, verification and submission.
pub fn admission_router<R, P, T, C>(service: SharedService<R, P, T, C>) -> Router
where
    R: PropositionRepository + 'static,
    P: CandidateProfileTranslator + 'static,
    T: TrainingTranslator + 'static,
    C: EnrollmentCalendar + 'static,
{
    Router::new()
        .route(
            "/api/v1/admission/propositions/:uuid/pool",
            post(determine_handler::<R, P, T, C>),
        )
        .route(
            "/api/v1/admission/propositions/:uuid/verify",
            post(verify_handler::<R, P, T, C>),
        )
        .route(
            "/api/v1/admission/propositions/:uuid/confirmation-elements",
            get(confirmation_elements_handler::<R, P, T, C>),
        )
        .route(
            "/api/v1/admission/propositions/:uuid/submit",
            post(submit_handler::<R, P, T, C>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ElementsQuery {
    annee: Option<i32>,
}

pub(crate) async fn determine_handler<R, P, T, C>(
    State(service): State<SharedService<R, P, T, C>>,
    Path(uuid): Path<String>,
) -> Response
where
    R: PropositionRepository + 'static,
    P: CandidateProfileTranslator + 'static,
    T: TrainingTranslator + 'static,
    C: EnrollmentCalendar + 'static,
{
    match service.determine(&PropositionId(uuid)) {
        Ok(determination) => (StatusCode::OK, axum::Json(determination)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verify_handler<R, P, T, C>(
    State(service): State<SharedService<R, P, T, C>>,
    Path(uuid): Path<String>,
    submitted: Option<axum::Json<SubmittedChoice>>,
) -> Response
where
    R: PropositionRepository + 'static,
    P: CandidateProfileTranslator + 'static,
    T: TrainingTranslator + 'static,
    C: EnrollmentCalendar + 'static,
{
    let submitted = submitted.map(|axum::Json(choice)| choice).unwrap_or_default();
    match service.verify(&PropositionId(uuid), submitted) {
        Ok(determination) => (StatusCode::OK, axum::Json(determination)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirmation_elements_handler<R, P, T, C>(
    State(service): State<SharedService<R, P, T, C>>,
    Path(uuid): Path<String>,
    Query(query): Query<ElementsQuery>,
) -> Response
where
    R: PropositionRepository + 'static,
    P: CandidateProfileTranslator + 'static,
    T: TrainingTranslator + 'static,
    C: EnrollmentCalendar + 'static,
{
    if let Some(year) = query.annee.filter(|year| !QUERY_YEARS.contains(year)) {
        let payload = json!({
            "error": format!("academic year {year} is out of range"),
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    match service.confirmation_elements(&PropositionId(uuid), query.annee) {
        Ok(elements) => (StatusCode::OK, axum::Json(elements)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, P, T, C>(
    State(service): State<SharedService<R, P, T, C>>,
    Path(uuid): Path<String>,
    axum::Json(request): axum::Json<SubmissionRequest>,
) -> Response
where
    R: PropositionRepository + 'static,
    P: CandidateProfileTranslator + 'static,
    T: TrainingTranslator + 'static,
    C: EnrollmentCalendar + 'static,
{
    match service.submit(&PropositionId(uuid), request) {
        Ok(proposition) => {
            let view = PropositionStatusView::from_proposition(&proposition);
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: AdmissionServiceError) -> Response {
    match error {
        AdmissionServiceError::Business(error) => {
            let status = match error.kind() {
                ErrorKind::IncompletePrerequisite | ErrorKind::PolicyViolation => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorKind::Consistency => StatusCode::CONFLICT,
                ErrorKind::InvariantViolation => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let view = error.view();
            let payload = json!({
                "error": view.detail.clone(),
                "errors": [view],
            });
            (status, axum::Json(payload)).into_response()
        }
        AdmissionServiceError::Multiple(errors) => {
            let payload = json!({
                "error": errors.to_string(),
                "errors": errors.views(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        AdmissionServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "error": "proposition not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        error @ AdmissionServiceError::NotSubmittable(_) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
