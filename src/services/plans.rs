use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        production_plan::{self, Entity as PlanEntity},
        production_record::{self, Entity as RecordEntity},
    },
    errors::ServiceError,
    services::{
        completion::{
            compute_completion, CompletionBand, PlanSlot, ProcessCompletion, ProductionPlan,
            PLAN_SLOT_LIMIT,
        },
        records::RecordFilter,
    },
};

/// Plan as submitted: four named process/quantity slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlanInput {
    #[validate(length(min = 1, max = 200))]
    pub product: String,
    #[serde(default)]
    pub process1: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 2147483647))]
    pub qty1: i64,
    #[serde(default)]
    pub process2: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 2147483647))]
    pub qty2: i64,
    #[serde(default)]
    pub process3: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 2147483647))]
    pub qty3: i64,
    #[serde(default)]
    pub process4: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 2147483647))]
    pub qty4: i64,
}

/// Slot contents ready to store, positions preserved.
type StoredSlots = [(Option<String>, i32); PLAN_SLOT_LIMIT];

impl PlanInput {
    fn raw_slots(&self) -> [(Option<&str>, i64); PLAN_SLOT_LIMIT] {
        [
            (self.process1.as_deref(), self.qty1),
            (self.process2.as_deref(), self.qty2),
            (self.process3.as_deref(), self.qty3),
            (self.process4.as_deref(), self.qty4),
        ]
    }

    /// Trims names and checks slot consistency.
    fn stored_slots(&self) -> Result<StoredSlots, ServiceError> {
        let mut stored: StoredSlots = Default::default();
        let mut seen = HashSet::new();

        for (index, (process, qty)) in self.raw_slots().into_iter().enumerate() {
            let slot = index + 1;
            if qty < 0 {
                return Err(ServiceError::ValidationError(format!(
                    "qty{} must not be negative",
                    slot
                )));
            }
            let qty = i32::try_from(qty).map_err(|_| {
                ServiceError::ValidationError(format!("qty{} is out of range", slot))
            })?;

            match process.map(str::trim).filter(|p| !p.is_empty()) {
                Some(name) => {
                    if !seen.insert(name.to_string()) {
                        return Err(ServiceError::ValidationError(format!(
                            "process '{}' appears more than once in the plan",
                            name
                        )));
                    }
                    stored[index] = (Some(name.to_string()), qty);
                }
                None if qty > 0 => {
                    return Err(ServiceError::ValidationError(format!(
                        "qty{} is set but process{} is empty",
                        slot, slot
                    )));
                }
                None => {}
            }
        }

        Ok(stored)
    }
}

/// One row of a completion report as presented to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompletionView {
    pub process: String,
    pub planned_qty: i64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub actual_qty: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub completion_rate: Decimal,
    pub band: CompletionBand,
    /// Progress bar width in percent, within 0..=100
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub progress_width: Decimal,
}

impl From<ProcessCompletion> for CompletionView {
    fn from(completion: ProcessCompletion) -> Self {
        Self {
            band: completion.band(),
            progress_width: completion.progress_width(),
            process: completion.process,
            planned_qty: completion.planned_qty,
            actual_qty: completion.actual_qty,
            completion_rate: completion.completion_rate,
        }
    }
}

/// Entry of the `process_completion` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompletionSummary {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub actual_qty: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub completion_rate: Decimal,
}

/// A stored plan together with its server-computed completion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanView {
    pub id: i32,
    pub product: String,
    pub process1: String,
    pub qty1: i32,
    pub process2: String,
    pub qty2: i32,
    pub process3: String,
    pub qty3: i32,
    pub process4: String,
    pub qty4: i32,
    /// Configured slots in order
    pub slots: Vec<PlanSlot>,
    pub completion: Vec<CompletionView>,
    pub process_completion: BTreeMap<String, CompletionSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanView {
    fn new(model: production_plan::Model, completion: Vec<ProcessCompletion>) -> Self {
        let plan = ProductionPlan::from(&model);
        let process_completion = completion
            .iter()
            .map(|c| {
                (
                    c.process.clone(),
                    CompletionSummary {
                        actual_qty: c.actual_qty,
                        completion_rate: c.completion_rate,
                    },
                )
            })
            .collect();

        Self {
            id: model.id,
            product: model.product,
            process1: model.process1.unwrap_or_default(),
            qty1: model.qty1,
            process2: model.process2.unwrap_or_default(),
            qty2: model.qty2,
            process3: model.process3.unwrap_or_default(),
            qty3: model.qty3,
            process4: model.process4.unwrap_or_default(),
            qty4: model.qty4,
            slots: plan.slots,
            completion: completion.into_iter().map(CompletionView::from).collect(),
            process_completion,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Completion report for a single product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompletionReport {
    pub product: String,
    /// False when the product has no plan
    pub configured: bool,
    pub processes: Vec<CompletionView>,
}

/// Production plan service
#[derive(Clone)]
pub struct PlanService {
    db: Arc<DatabaseConnection>,
}

impl PlanService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists every plan with its completion, ordered by product
    #[instrument(skip(self))]
    pub async fn list_plans(&self) -> Result<Vec<PlanView>, ServiceError> {
        let db = &*self.db;
        let plans = PlanEntity::find()
            .order_by_asc(production_plan::Column::Product)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to list production plans: {}", e);
                ServiceError::db_error(e)
            })?;
        if plans.is_empty() {
            return Ok(Vec::new());
        }

        let products: Vec<&str> = plans.iter().map(|p| p.product.as_str()).collect();
        let records = RecordEntity::find()
            .filter(production_record::Column::Product.is_in(products))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut by_product: HashMap<String, Vec<production_record::Model>> = HashMap::new();
        for record in records {
            by_product
                .entry(record.product.clone())
                .or_default()
                .push(record);
        }

        Ok(plans
            .into_iter()
            .map(|model| {
                let plan = ProductionPlan::from(&model);
                let records = by_product
                    .get(&model.product)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let completion = compute_completion(Some(&plan), records);
                PlanView::new(model, completion)
            })
            .collect())
    }

    /// Creates the product's plan or replaces its slots
    #[instrument(skip(self, input), fields(product = %input.product))]
    pub async fn save_plan(&self, input: PlanInput) -> Result<PlanView, ServiceError> {
        input.validate()?;
        let product = input.product.trim().to_string();
        if product.is_empty() {
            return Err(ServiceError::ValidationError(
                "product must not be blank".to_string(),
            ));
        }
        let [(p1, q1), (p2, q2), (p3, q3), (p4, q4)] = input.stored_slots()?;

        let db = &*self.db;
        let existing = PlanEntity::find()
            .filter(production_plan::Column::Product.eq(product.as_str()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        let now = Utc::now();
        let (mut active, created) = match existing {
            Some(model) => (production_plan::ActiveModel::from(model), false),
            None => (
                production_plan::ActiveModel {
                    product: Set(product.clone()),
                    created_at: Set(now),
                    ..Default::default()
                },
                true,
            ),
        };
        active.process1 = Set(p1);
        active.qty1 = Set(q1);
        active.process2 = Set(p2);
        active.qty2 = Set(q2);
        active.process3 = Set(p3);
        active.qty3 = Set(q3);
        active.process4 = Set(p4);
        active.qty4 = Set(q4);
        active.updated_at = Set(now);

        let saved = if created {
            active.insert(db).await
        } else {
            active.update(db).await
        }
        .map_err(|e| {
            error!("Failed to save production plan: {}", e);
            ServiceError::from_write(e, || {
                format!(
                    "production plan for '{}' was created concurrently; retry the save",
                    product
                )
            })
        })?;

        counter!("prodtrack.plans.saved", 1);
        info!(plan_id = saved.id, created, "Production plan saved");

        let records = RecordFilter::for_product(saved.product.as_str())
            .apply(RecordEntity::find())
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let completion = compute_completion(Some(&ProductionPlan::from(&saved)), &records);
        Ok(PlanView::new(saved, completion))
    }

    #[instrument(skip(self))]
    pub async fn delete_plan(&self, id: i32) -> Result<(), ServiceError> {
        let result = PlanEntity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Production plan {} not found",
                id
            )));
        }

        info!(plan_id = id, "Production plan deleted");
        Ok(())
    }

    /// Completion of one product against its plan
    #[instrument(skip(self))]
    pub async fn get_completion(&self, product: &str) -> Result<CompletionReport, ServiceError> {
        let product = product.trim();
        if product.is_empty() {
            return Err(ServiceError::ValidationError(
                "product must not be blank".to_string(),
            ));
        }

        let db = &*self.db;
        let plan = PlanEntity::find()
            .filter(production_plan::Column::Product.eq(product))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .map(|model| ProductionPlan::from(&model));

        let Some(plan) = plan else {
            return Ok(CompletionReport {
                product: product.to_string(),
                configured: false,
                processes: Vec::new(),
            });
        };

        let records = RecordFilter::for_product(product)
            .apply(RecordEntity::find())
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let processes = compute_completion(Some(&plan), &records)
            .into_iter()
            .map(CompletionView::from)
            .collect();

        Ok(CompletionReport {
            product: product.to_string(),
            configured: true,
            processes,
        })
    }
}
