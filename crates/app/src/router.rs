use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use empdir_core::types::EmployeeDto;
use empdir_storage::Database;

use crate::problem::ErrorResponse;
use crate::service::EmployeeService;
use crate::telemetry;

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    storage: Database,
    service: EmployeeService,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database) -> Self {
        let service = EmployeeService::new(storage.clone());
        Self {
            metrics,
            storage,
            service,
        }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn storage(&self) -> &Database {
        &self.storage
    }

    pub fn service(&self) -> &EmployeeService {
        &self.service
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/employee/v1", get(list_employees).post(create_employee))
        .route(
            "/employee/v1/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
        .body(Body::from(body))
        .unwrap()
}

async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeDto>>, ErrorResponse> {
    let employees = state.service().list_all().await?;
    Ok(Json(employees))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmployeeDto>, ErrorResponse> {
    let employee = state.service().get_by_id(&id).await?;
    Ok(Json(employee))
}

async fn create_employee(
    State(state): State<AppState>,
    Json(body): Json<EmployeeDto>,
) -> Result<(StatusCode, Json<EmployeeDto>), ErrorResponse> {
    let created = state.service().create(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<EmployeeDto>,
) -> Result<Json<EmployeeDto>, ErrorResponse> {
    let updated = state.service().update(&id, body).await?;
    Ok(Json(updated))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    state.service().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
