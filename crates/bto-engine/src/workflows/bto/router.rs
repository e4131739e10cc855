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

use super::domain::{FlatType, Nric, ViewFilter};
use super::repository::{
    ApplicationRepository, ProjectRepository, RegistrationRepository, UserRepository,
};
use super::service::{BtoService, Decision, EngineError};

/// Router builder exposing the engine's operations as JSON endpoints. The
/// HTTP layer performs no business-rule evaluation; it decodes primitives
/// and renders typed outcomes.
pub fn bto_router<U, P, A, R>(service: Arc<BtoService<U, P, A, R>>) -> Router
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(apply_handler::<U, P, A, R>))
        .route(
            "/api/v1/applications/:application_id",
            get(application_handler::<U, P, A, R>),
        )
        .route(
            "/api/v1/applications/:application_id/withdrawal",
            post(withdraw_handler::<U, P, A, R>),
        )
        .route(
            "/api/v1/applications/:application_id/decision",
            post(application_decision_handler::<U, P, A, R>),
        )
        .route("/api/v1/registrations", post(register_handler::<U, P, A, R>))
        .route(
            "/api/v1/registrations/:registration_id",
            get(registration_handler::<U, P, A, R>),
        )
        .route(
            "/api/v1/registrations/:registration_id/decision",
            post(registration_decision_handler::<U, P, A, R>),
        )
        .route("/api/v1/projects", get(projects_handler::<U, P, A, R>))
        .route(
            "/api/v1/managers/:nric/projects",
            get(manager_projects_handler::<U, P, A, R>),
        )
        .route(
            "/api/v1/officers/:nric/projects",
            get(officer_projects_handler::<U, P, A, R>),
        )
        .with_state(service)
}

fn error_response(error: EngineError) -> Response {
    let status = match &error {
        EngineError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn invalid_nric(raw: &str) -> Response {
    let payload = json!({ "error": format!("invalid NRIC '{raw}'") });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyRequest {
    pub(crate) applicant_nric: Nric,
    pub(crate) project_id: u32,
    pub(crate) flat_type: FlatType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithdrawRequest {
    pub(crate) requester_nric: Nric,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    pub(crate) manager_nric: Nric,
    pub(crate) outcome: Decision,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) officer_nric: Nric,
    pub(crate) project_id: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProjectQuery {
    pub(crate) room_type: Option<FlatType>,
    pub(crate) min_price: Option<u32>,
    pub(crate) max_price: Option<u32>,
}

async fn apply_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match service.apply(&request.applicant_nric, request.project_id, request.flat_type) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn application_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    Path(application_id): Path<u32>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match service.application(application_id) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn withdraw_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    Path(application_id): Path<u32>,
    axum::Json(request): axum::Json<WithdrawRequest>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match service.withdraw(application_id, &request.requester_nric) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn application_decision_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    Path(application_id): Path<u32>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match service.decide_application(application_id, &request.manager_nric, request.outcome) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn register_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    axum::Json(request): axum::Json<RegisterRequest>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match service.register(&request.officer_nric, request.project_id) {
        Ok(registration) => (StatusCode::CREATED, axum::Json(registration)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn registration_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    Path(registration_id): Path<u32>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match service.registration(registration_id) {
        Ok(registration) => (StatusCode::OK, axum::Json(registration)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn registration_decision_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    Path(registration_id): Path<u32>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match service.decide_registration(registration_id, &request.manager_nric, request.outcome) {
        Ok(registration) => (StatusCode::OK, axum::Json(registration)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn projects_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    Query(query): Query<ProjectQuery>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let filter = ViewFilter {
        room_type: query.room_type,
        min_price: query.min_price,
        max_price: query.max_price,
    };
    let projects = if filter.is_empty() {
        service.visible_projects()
    } else {
        service.filtered_visible_projects(&filter)
    };
    (StatusCode::OK, axum::Json(projects)).into_response()
}

async fn manager_projects_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    Path(nric): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match Nric::parse(&nric) {
        Ok(manager) => {
            (StatusCode::OK, axum::Json(service.manager_projects(&manager))).into_response()
        }
        Err(_) => invalid_nric(&nric),
    }
}

async fn officer_projects_handler<U, P, A, R>(
    State(service): State<Arc<BtoService<U, P, A, R>>>,
    Path(nric): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match Nric::parse(&nric) {
        Ok(officer) => {
            (StatusCode::OK, axum::Json(service.officer_projects(&officer))).into_response()
        }
        Err(_) => invalid_nric(&nric),
    }
}
