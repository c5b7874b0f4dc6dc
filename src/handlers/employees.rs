use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::entities::employee;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::employees::CreateEmployeeInput;
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};

pub fn employees_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route("/:id", delete(delete_employee))
}

/// List employees by name
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "All employees", body = crate::ApiResponse<Vec<employee::Model>>)
    ),
    tag = "Employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let employees = state.services.employees.list_employees().await?;
    Ok(success_response(employees))
}

/// Add an employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeInput,
    responses(
        (status = 201, description = "Employee created", body = crate::ApiResponse<employee::Model>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let employee = state.services.employees.create_employee(payload).await?;
    Ok(created_response(employee))
}

/// Remove an employee no record refers to
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Referenced by records", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.employees.delete_employee(id).await?;
    Ok(no_content_response())
}
