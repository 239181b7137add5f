//! # API REST
//!
//! REST API implementation for PMS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Mapping core errors to status codes and `{"detail": ...}` bodies
//!
//! Uses `api-shared` for response payloads and `pms-core` for every data operation.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{ErrorRes, HealthRes, HealthService, MessageRes};
use pms_core::constants::{
    PATIENT_CREATED_MESSAGE, PATIENT_DELETED_MESSAGE, PATIENT_UPDATED_MESSAGE,
};
use pms_core::{
    Gender, Patient, PatientError, PatientService, PatientUpdate, PatientView, PatientWire,
    ValidationError, Verdict,
};

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    patient_service: PatientService,
}

impl AppState {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

type ApiError = (StatusCode, Json<ErrorRes>);
type ApiResult<T> = Result<T, ApiError>;

#[derive(OpenApi)]
#[openapi(
    paths(
        home,
        about,
        health,
        view_patients,
        view_patient,
        sort_patients,
        create_patient,
        update_patient,
        delete_patient,
    ),
    components(schemas(
        MessageRes,
        ErrorRes,
        HealthRes,
        PatientWire,
        PatientUpdate,
        PatientView,
        Gender,
        Verdict,
    )),
    tags((name = "patients", description = "Patient record management"))
)]
pub struct ApiDoc;

/// Builds the full application router, including Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/health", get(health))
        .route("/view", get(view_patients))
        .route("/patient/:id", get(view_patient))
        .route("/sort", get(sort_patients))
        .route("/create", post(create_patient))
        .route("/edit/:id", put(update_patient))
        .route("/delete/:id", delete(delete_patient))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a core error to its HTTP status and error body.
///
/// Client errors carry their message through; anything else is logged and reported as a generic
/// internal error.
fn error_response(context: &str, err: PatientError) -> ApiError {
    let status = match &err {
        PatientError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PatientError::NotFound(_) => StatusCode::NOT_FOUND,
        PatientError::AlreadyExists(_)
        | PatientError::InvalidArgument(_)
        | PatientError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if err.is_client_error() {
        tracing::debug!("{} rejected: {}", context, err);
        (status, Json(ErrorRes::new(err.to_string())))
    } else {
        tracing::error!("{} error: {:?}", context, err);
        (status, Json(ErrorRes::new("Internal error")))
    }
}

/// Unwraps a JSON request body.
///
/// A body that is not JSON, or is sent without a JSON content type, fails validation like any
/// other bad body: 422 with a `detail` message.
fn json_body(
    context: &str,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(error_response(
            context,
            ValidationError::new("body", rejection.body_text()).into(),
        )),
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = MessageRes))
)]
async fn home() -> Json<MessageRes> {
    Json(MessageRes::new("Patient Management System API"))
}

#[utoipa::path(
    get,
    path = "/about",
    responses((status = 200, description = "Service description", body = MessageRes))
)]
async fn about() -> Json<MessageRes> {
    Json(MessageRes::new(
        "A fully functional Patient Management System API.",
    ))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/view",
    tag = "patients",
    responses(
        (status = 200, description = "Every patient keyed by id", body = BTreeMap<String, PatientView>),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List all patients
///
/// Returns the whole collection as an object keyed by patient id. Each value includes the
/// computed `bmi` and `verdict`.
#[axum::debug_handler]
async fn view_patients(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, PatientView>>> {
    match state.patient_service.list_patients() {
        Ok(patients) => Ok(Json(patients)),
        Err(e) => Err(error_response("List patients", e)),
    }
}

#[utoipa::path(
    get,
    path = "/patient/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "The ID of the patient to retrieve", example = "P001")),
    responses(
        (status = 200, description = "Patient record", body = PatientView),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn view_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientView>> {
    match state.patient_service.get_patient(&id) {
        Ok(patient) => Ok(Json(patient)),
        Err(e) => Err(error_response("View patient", e)),
    }
}

/// Query string of `/sort`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct SortParams {
    /// The attribute to sort patients by: height, weight, age or bmi
    #[param(example = "age")]
    sort_by: Option<String>,
    /// Sort order: 'asc' for ascending (default), 'desc' for descending
    #[param(example = "asc")]
    order: Option<String>,
}

#[utoipa::path(
    get,
    path = "/sort",
    tag = "patients",
    params(SortParams),
    responses(
        (status = 200, description = "Patients in the requested order", body = Vec<PatientView>),
        (status = 400, description = "Invalid sort_by or order", body = ErrorRes),
        (status = 422, description = "Missing sort_by", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Sort patients by a numeric field
///
/// Ties keep their order from `/view`.
#[axum::debug_handler]
async fn sort_patients(
    State(state): State<AppState>,
    Query(params): Query<SortParams>,
) -> ApiResult<Json<Vec<PatientView>>> {
    let Some(sort_by) = params.sort_by else {
        return Err(error_response(
            "Sort patients",
            ValidationError::new("sort_by", "field required").into(),
        ));
    };

    match state
        .patient_service
        .sort_patients(&sort_by, params.order.as_deref())
    {
        Ok(patients) => Ok(Json(patients)),
        Err(e) => Err(error_response("Sort patients", e)),
    }
}

#[utoipa::path(
    post,
    path = "/create",
    tag = "patients",
    request_body = PatientWire,
    responses(
        (status = 201, description = "Patient created", body = MessageRes),
        (status = 400, description = "Patient already exists", body = ErrorRes),
        (status = 422, description = "Body failed validation", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Create a new patient record
///
/// The body is validated in full before the collection is touched. `bmi` and `verdict` are never
/// accepted from the client.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageRes>)> {
    let body = json_body("Create patient", body)?;
    let patient = Patient::from_json(body)
        .map_err(|e| error_response("Create patient", e.into()))?;

    match state.patient_service.create_patient(patient) {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(MessageRes::new(PATIENT_CREATED_MESSAGE)),
        )),
        Err(e) => Err(error_response("Create patient", e)),
    }
}

#[utoipa::path(
    put,
    path = "/edit/{id}",
    tag = "patients",
    request_body = PatientUpdate,
    params(("id" = String, Path, description = "The ID of the patient to update", example = "P001")),
    responses(
        (status = 200, description = "Patient updated", body = MessageRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Update or merged record failed validation", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Update an existing patient
///
/// Only the fields present in the body are changed. The merged record is validated again before
/// it is saved.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<Json<MessageRes>> {
    let body = json_body("Update patient", body)?;
    let changes = PatientUpdate::from_json(body)
        .and_then(PatientUpdate::into_changes)
        .map_err(|e| error_response("Update patient", e.into()))?;

    match state.patient_service.update_patient(&id, changes) {
        Ok(()) => Ok(Json(MessageRes::new(PATIENT_UPDATED_MESSAGE))),
        Err(e) => Err(error_response("Update patient", e)),
    }
}

#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "The ID of the patient to delete", example = "P001")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageRes>> {
    match state.patient_service.delete_patient(&id) {
        Ok(()) => Ok(Json(MessageRes::new(PATIENT_DELETED_MESSAGE))),
        Err(e) => Err(error_response("Delete patient", e)),
    }
}
