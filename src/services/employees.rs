use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        employee::{self, Entity as EmployeeEntity},
        production_record::{self, Entity as RecordEntity},
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEmployeeInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub position: String,
}

/// Employee roster service
#[derive(Clone)]
pub struct EmployeeService {
    db: Arc<DatabaseConnection>,
}

impl EmployeeService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_employees(&self) -> Result<Vec<employee::Model>, ServiceError> {
        EmployeeEntity::find()
            .order_by_asc(employee::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn create_employee(
        &self,
        input: CreateEmployeeInput,
    ) -> Result<employee::Model, ServiceError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        let position = input.position.trim().to_string();
        if name.is_empty() || position.is_empty() {
            return Err(ServiceError::ValidationError(
                "name and position must not be blank".to_string(),
            ));
        }

        let existing = EmployeeEntity::find()
            .filter(employee::Column::Name.eq(name.as_str()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "employee '{}' already exists",
                name
            )));
        }

        let created = employee::ActiveModel {
            name: Set(name.clone()),
            position: Set(position),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!("Failed to create employee: {}", e);
            ServiceError::from_write(e, || format!("employee '{}' already exists", name))
        })?;

        counter!("prodtrack.employees.created", 1);
        info!(employee_id = created.id, "Employee created");
        Ok(created)
    }

    /// Deletes an employee no record refers to
    #[instrument(skip(self))]
    pub async fn delete_employee(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        let employee = EmployeeEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {} not found", id)))?;

        let references = RecordEntity::find()
            .filter(
                Condition::any()
                    .add(production_record::Column::Name.eq(employee.name.as_str()))
                    .add(production_record::Column::AdjustmentMaster.eq(employee.name.as_str())),
            )
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if references > 0 {
            warn!(employee_id = id, references, "Refused to delete referenced employee");
            return Err(ServiceError::Conflict(format!(
                "employee '{}' is referenced by {} records",
                employee.name, references
            )));
        }

        EmployeeEntity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(employee_id = id, "Employee deleted");
        Ok(())
    }
}
