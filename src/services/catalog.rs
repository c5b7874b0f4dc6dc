//! Process and product vocabularies.
//!
//! Records and plans refer to both by name, so deletion is refused while any
//! reference remains.

use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        process::{self, Entity as ProcessEntity},
        product::{self, Entity as ProductEntity},
        production_plan::{self, Entity as PlanEntity},
        production_record::{self, Entity as RecordEntity},
    },
    errors::ServiceError,
};

/// Name plus optional description, shared by processes and products
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CatalogEntryInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl CatalogEntryInput {
    fn normalized(self) -> Result<(String, Option<String>), ServiceError> {
        self.validate()?;
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name must not be blank".to_string(),
            ));
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok((name, description))
    }
}

fn in_use(kind: &str, name: &str, records: u64, plans: u64) -> ServiceError {
    let mut uses = Vec::new();
    if records > 0 {
        uses.push(format!("{} records", records));
    }
    if plans > 0 {
        uses.push(format!("{} production plans", plans));
    }
    ServiceError::Conflict(format!(
        "{} '{}' is used by {}",
        kind,
        name,
        uses.join(" and ")
    ))
}

/// Manufacturing process vocabulary service
#[derive(Clone)]
pub struct ProcessService {
    db: Arc<DatabaseConnection>,
}

impl ProcessService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_processes(&self) -> Result<Vec<process::Model>, ServiceError> {
        ProcessEntity::find()
            .order_by_asc(process::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn create_process(
        &self,
        input: CatalogEntryInput,
    ) -> Result<process::Model, ServiceError> {
        let (name, description) = input.normalized()?;

        let existing = ProcessEntity::find()
            .filter(process::Column::Name.eq(name.as_str()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "process '{}' already exists",
                name
            )));
        }

        let created = process::ActiveModel {
            name: Set(name.clone()),
            description: Set(description),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            ServiceError::from_write(e, || format!("process '{}' already exists", name))
        })?;

        counter!("prodtrack.processes.created", 1);
        info!(process_id = created.id, "Process created");
        Ok(created)
    }

    /// Deletes a process no record or plan slot refers to
    #[instrument(skip(self))]
    pub async fn delete_process(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        let process = ProcessEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Process {} not found", id)))?;
        let name = process.name.as_str();

        let records = RecordEntity::find()
            .filter(production_record::Column::Process.eq(name))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let plans = PlanEntity::find()
            .filter(
                Condition::any()
                    .add(production_plan::Column::Process1.eq(name))
                    .add(production_plan::Column::Process2.eq(name))
                    .add(production_plan::Column::Process3.eq(name))
                    .add(production_plan::Column::Process4.eq(name)),
            )
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if records > 0 || plans > 0 {
            warn!(process_id = id, records, plans, "Refused to delete process in use");
            return Err(in_use("process", name, records, plans));
        }

        ProcessEntity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(process_id = id, "Process deleted");
        Ok(())
    }
}

/// Product vocabulary service
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        ProductEntity::find()
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CatalogEntryInput,
    ) -> Result<product::Model, ServiceError> {
        let (name, description) = input.normalized()?;

        let existing = ProductEntity::find()
            .filter(product::Column::Name.eq(name.as_str()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "product '{}' already exists",
                name
            )));
        }

        let created = product::ActiveModel {
            name: Set(name.clone()),
            description: Set(description),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            ServiceError::from_write(e, || format!("product '{}' already exists", name))
        })?;

        counter!("prodtrack.products.created", 1);
        info!(product_id = created.id, "Product created");
        Ok(created)
    }

    /// Deletes a product no record or plan refers to
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        let product = ProductEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;
        let name = product.name.as_str();

        let records = RecordEntity::find()
            .filter(production_record::Column::Product.eq(name))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let plans = PlanEntity::find()
            .filter(production_plan::Column::Product.eq(name))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if records > 0 || plans > 0 {
            warn!(product_id = id, records, plans, "Refused to delete product in use");
            return Err(in_use("product", name, records, plans));
        }

        ProductEntity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(product_id = id, "Product deleted");
        Ok(())
    }
}
