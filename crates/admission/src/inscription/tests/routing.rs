use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::calendar::{AcademicCalendarType, PoolCalendar, PoolRegistry};
use crate::inscription::in_memory::{
    CalendarView, InMemoryProfiles, InMemoryPropositions, InMemoryTrainings,
};
use crate::inscription::resolver::{PoolResolver, ResolverSettings};
use crate::inscription::router::admission_router;

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn pool_route_returns_determination() {
    let harness = single(
        general("p-be", "c-be", "ECGE1BA", answered()),
        belgian("c-be"),
        autumn(),
    );
    let app = admission_router(harness.service.clone());

    let response = app
        .oneshot(
            Request::post("/api/v1/admission/propositions/p-be/pool")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({"year": 2024, "pool": "ADMISSION_POOL_UE5_BELGIAN"}));
}

#[tokio::test]
async fn verify_route_reports_stale_choice_as_conflict() {
    let harness = single(
        general("p-be", "c-be", "ECGE1BA", answered()),
        belgian("c-be"),
        autumn(),
    );
    let app = admission_router(harness.service.clone());

    let response = app
        .oneshot(post_json(
            "/api/v1/admission/propositions/p-be/verify",
            &json!({"year": 2025, "pool": "ADMISSION_POOL_UE5_BELGIAN"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["errors"][0]["status_code"], "ADMISSION-13");
    assert_eq!(body["errors"][0]["kind"], "consistency");
}

#[tokio::test]
async fn confirmation_elements_route_uses_requested_year() {
    let harness = single(
        general("p-be", "c-be", "ECGE1BA", answered()),
        belgian("c-be"),
        autumn(),
    );
    let app = admission_router(harness.service.clone());

    let response = app
        .oneshot(
            Request::get("/api/v1/admission/propositions/p-be/confirmation-elements?annee=2025")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body[0]["name"], "hors_delai");
    assert_eq!(body[0]["type"], "checkbox");
    assert!(body[0].get("answers").is_none());
}

#[tokio::test]
async fn elements_route_rejects_out_of_range_year() {
    let harness = single(
        general("p-be", "c-be", "ECGE1BA", answered()),
        belgian("c-be"),
        autumn(),
    );
    let app = admission_router(harness.service.clone());

    let response = app
        .oneshot(
            Request::get(
                "/api/v1/admission/propositions/p-be/confirmation-elements?annee=2147483647",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "academic year 2147483647 is out of range");
}

#[tokio::test]
async fn submit_route_accepts_complete_submission() {
    let harness = single(
        general("p-be", "c-be", "ECGE1BA", answered()),
        belgian("c-be"),
        autumn(),
    );
    let elements = harness
        .service
        .confirmation_elements(&id("p-be"), Some(2024))
        .expect("elements");
    let payload = json!({
        "year": 2024,
        "pool": "ADMISSION_POOL_UE5_BELGIAN",
        "elements": crate::inscription::confirmation::expected_answers(&elements),
    });
    let app = admission_router(harness.service.clone());

    let response = app
        .oneshot(post_json(
            "/api/v1/admission/propositions/p-be/submit",
            &payload,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "submitted");
    assert_eq!(body["pool"], "ADMISSION_POOL_UE5_BELGIAN");
}

#[tokio::test]
async fn submit_route_lists_missing_prerequisites() {
    let harness = single(
        general("p-in", "c-in", "ECGE1BA", answered()),
        incomplete("c-in"),
        autumn(),
    );
    let app = admission_router(harness.service.clone());

    let response = app
        .oneshot(post_json(
            "/api/v1/admission/propositions/p-in/submit",
            &json!({"year": 2024, "pool": "ADMISSION_POOL_UE5_BELGIAN"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    let codes: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .filter_map(|error| error["status_code"].as_str())
        .collect();
    assert_eq!(codes, vec!["PROPOSITION-25", "PROPOSITION-31"]);
}

#[tokio::test]
async fn unknown_proposition_is_not_found() {
    let harness = single(
        general("p-be", "c-be", "ECGE1BA", answered()),
        belgian("c-be"),
        autumn(),
    );

    let response = crate::inscription::router::determine_handler::<
        InMemoryPropositions,
        InMemoryProfiles,
        InMemoryTrainings,
        CalendarView,
    >(State(harness.service.clone()), Path("p-missing".to_string()))
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exhausted_pools_surface_as_internal_error() {
    let registry = PoolRegistry::new(
        Vec::new(),
        vec![PoolCalendar::standard(
            AcademicCalendarType::DoctorateEducationEnrollment,
        )],
    );
    let harness = build_service(
        vec![general("p-no", "c-no", "ECGE1BA", answered())],
        vec![belgian("c-no")],
        calendar_at(autumn()),
        PoolResolver::new(registry, ResolverSettings::current()),
    );

    let response = crate::inscription::router::determine_handler::<
        InMemoryPropositions,
        InMemoryProfiles,
        InMemoryTrainings,
        CalendarView,
    >(State(harness.service.clone()), Path("p-no".to_string()))
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["errors"][0]["status_code"], "ADMISSION-12");
}
