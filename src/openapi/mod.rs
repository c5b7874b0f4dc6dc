use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Production Tracking API",
        version = "1.0.0",
        description = r#"
# Production Tracking API

Records per-shift output on the manufacturing floor and reports progress
against production plans.

## Features

- **Records**: operator entries with derived runtimes, quantities and rates
- **Production Plans**: up to four processes per product with planned quantities
- **Completion**: per-process actual output, completion rate and display band
- **Reference Data**: employees, processes and products

## Error Handling

Errors share one body format:

```json
{
  "error": "Conflict",
  "message": "process 'cut' is used by 3 records",
  "request_id": "0b7c...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Records", description = "Production record endpoints"),
        (name = "Production Plans", description = "Plans and completion reports"),
        (name = "Employees", description = "Employee roster"),
        (name = "Processes", description = "Process vocabulary"),
        (name = "Products", description = "Product vocabulary")
    ),
    paths(
        // Records
        crate::handlers::records::list_records,
        crate::handlers::records::get_record,
        crate::handlers::records::create_record,
        crate::handlers::records::update_record,
        crate::handlers::records::update_record_process,
        crate::handlers::records::delete_record,
        crate::handlers::records::get_record_comment,
        crate::handlers::records::save_record_comment,
        crate::handlers::statistics::get_statistics,

        // Plans
        crate::handlers::plans::list_plans,
        crate::handlers::plans::save_plan,
        crate::handlers::plans::delete_plan,
        crate::handlers::plans::get_completion,

        // Reference data
        crate::handlers::employees::list_employees,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::delete_employee,
        crate::handlers::processes::list_processes,
        crate::handlers::processes::create_process,
        crate::handlers::processes::delete_process,
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::delete_product,
    ),
    components(
        schemas(
            crate::ResponseMeta,
            crate::entities::production_record::Model,
            crate::entities::employee::Model,
            crate::entities::process::Model,
            crate::entities::product::Model,
            crate::services::records::RecordInput,
            crate::services::records::RecordPatch,
            crate::services::comments::CommentBody,
            crate::services::statistics::RecordStatistics,
            crate::services::plans::PlanInput,
            crate::services::plans::PlanView,
            crate::services::plans::CompletionView,
            crate::services::plans::CompletionSummary,
            crate::services::plans::CompletionReport,
            crate::services::completion::PlanSlot,
            crate::services::completion::CompletionBand,
            crate::services::employees::CreateEmployeeInput,
            crate::services::catalog::CatalogEntryInput,
            crate::handlers::records::ProcessTransition,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let json = ApiDocV1::openapi().to_json().unwrap();
        assert!(json.contains("Production Tracking API"));
        assert!(json.contains("/api/v1/records"));
        assert!(json.contains("/api/v1/production-plans"));
        assert!(json.contains("/api/v1/completion"));
        assert!(json.contains("CompletionBand"));
    }
}
