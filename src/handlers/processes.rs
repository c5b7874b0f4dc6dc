use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::entities::process;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::catalog::CatalogEntryInput;
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};

pub fn processes_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_processes).post(create_process))
        .route("/:id", delete(delete_process))
}

/// List processes by name
#[utoipa::path(
    get,
    path = "/api/v1/processes",
    responses(
        (status = 200, description = "All processes", body = crate::ApiResponse<Vec<process::Model>>)
    ),
    tag = "Processes"
)]
pub async fn list_processes(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let processes = state.services.processes.list_processes().await?;
    Ok(success_response(processes))
}

/// Add a process
#[utoipa::path(
    post,
    path = "/api/v1/processes",
    request_body = CatalogEntryInput,
    responses(
        (status = 201, description = "Process created", body = crate::ApiResponse<process::Model>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "Processes"
)]
pub async fn create_process(
    State(state): State<AppState>,
    Json(payload): Json<CatalogEntryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let process = state.services.processes.create_process(payload).await?;
    Ok(created_response(process))
}

/// Remove a process no record or plan uses
#[utoipa::path(
    delete,
    path = "/api/v1/processes/{id}",
    params(("id" = i32, Path, description = "Process id")),
    responses(
        (status = 204, description = "Process deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Used by records or plans", body = crate::errors::ErrorResponse)
    ),
    tag = "Processes"
)]
pub async fn delete_process(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.processes.delete_process(id).await?;
    Ok(no_content_response())
}
