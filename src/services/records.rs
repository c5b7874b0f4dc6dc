use chrono::{NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Select, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    entities::{
        comment::{self, Entity as CommentEntity},
        employee::{self, Entity as EmployeeEntity},
        production_record::{self, Entity as RecordEntity},
    },
    errors::ServiceError,
    services::{
        completion::parse_quantity,
        derived::{apply_derived_fields, Measurements},
    },
};

/// Full record payload used for creation.
///
/// Measurement fields are free text and may be left blank; derived columns
/// are recomputed on every write regardless of what is submitted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordInput {
    #[schema(value_type = String, format = Date, example = "2024-06-03")]
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub position: String,
    #[validate(length(min = 1))]
    pub product: String,
    #[validate(length(min = 1, max = 200))]
    pub process: String,
    #[serde(default)]
    pub theoretical_runtime: String,
    #[serde(default)]
    pub actual_runtime: String,
    #[serde(default)]
    pub single_time: String,
    #[serde(default)]
    pub theoretical_qty: String,
    #[serde(default)]
    pub actual_qty: String,
    #[serde(default)]
    pub total_weight: String,
    #[serde(default)]
    pub unit_weight: String,
    #[serde(default)]
    pub tare_weight: String,
    #[serde(default)]
    pub capacity_rate: String,
    #[serde(default)]
    pub time_rate: String,
    #[serde(default)]
    pub downtime_duration: String,
    #[serde(default)]
    pub adjustment_time: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub adjustment_master: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct RecordPatch {
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub position: Option<String>,
    #[validate(length(min = 1))]
    pub product: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub process: Option<String>,
    pub theoretical_runtime: Option<String>,
    pub actual_runtime: Option<String>,
    pub single_time: Option<String>,
    pub theoretical_qty: Option<String>,
    pub actual_qty: Option<String>,
    pub total_weight: Option<String>,
    pub unit_weight: Option<String>,
    pub tare_weight: Option<String>,
    pub capacity_rate: Option<String>,
    pub time_rate: Option<String>,
    pub downtime_duration: Option<String>,
    pub adjustment_time: Option<String>,
    pub adjustment_master: Option<String>,
}

/// Conjunctive record filters; blank values impose no restriction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordFilter {
    /// Inclusive lower bound on the record date
    #[param(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the record date
    #[param(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub name: Option<String>,
    pub product: Option<String>,
    pub process: Option<String>,
    pub adjustment_master: Option<String>,
}

impl RecordFilter {
    pub fn for_product(product: impl Into<String>) -> Self {
        Self {
            product: Some(product.into()),
            ..Default::default()
        }
    }

    fn condition(&self) -> Condition {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        let mut condition = Condition::all();
        if let Some(start) = self.start_date {
            condition = condition.add(production_record::Column::Date.gte(start));
        }
        if let Some(end) = self.end_date {
            condition = condition.add(production_record::Column::Date.lte(end));
        }
        if let Some(name) = present(&self.name) {
            condition = condition.add(production_record::Column::Name.eq(name));
        }
        if let Some(product) = present(&self.product) {
            condition = condition.add(production_record::Column::Product.eq(product));
        }
        if let Some(process) = present(&self.process) {
            condition = condition.add(production_record::Column::Process.eq(process));
        }
        if let Some(master) = present(&self.adjustment_master) {
            condition = condition.add(production_record::Column::AdjustmentMaster.eq(master));
        }
        condition
    }

    /// Applies the filter to a record query, newest first.
    pub fn apply(&self, select: Select<RecordEntity>) -> Select<RecordEntity> {
        select
            .filter(self.condition())
            .order_by_desc(production_record::Column::Date)
            .order_by_desc(production_record::Column::Id)
    }
}

/// Editable record content, independent of storage bookkeeping.
#[derive(Debug, Clone)]
struct RecordFields {
    date: NaiveDate,
    name: String,
    position: String,
    product: String,
    process: String,
    measurements: Measurements,
    adjustment_master: String,
}

impl From<RecordInput> for RecordFields {
    fn from(input: RecordInput) -> Self {
        Self {
            date: input.date,
            name: input.name.trim().to_string(),
            position: input.position.trim().to_string(),
            product: input.product.trim().to_string(),
            process: input.process.trim().to_string(),
            measurements: Measurements {
                theoretical_runtime: input.theoretical_runtime,
                actual_runtime: input.actual_runtime,
                single_time: input.single_time,
                theoretical_qty: input.theoretical_qty,
                actual_qty: input.actual_qty,
                total_weight: input.total_weight,
                unit_weight: input.unit_weight,
                tare_weight: input.tare_weight,
                capacity_rate: input.capacity_rate,
                time_rate: input.time_rate,
                downtime_duration: input.downtime_duration,
                adjustment_time: input.adjustment_time,
            },
            adjustment_master: input.adjustment_master.trim().to_string(),
        }
    }
}

impl From<&production_record::Model> for RecordFields {
    fn from(model: &production_record::Model) -> Self {
        Self {
            date: model.date,
            name: model.name.clone(),
            position: model.position.clone(),
            product: model.product.clone(),
            process: model.process.clone(),
            measurements: Measurements {
                theoretical_runtime: model.theoretical_runtime.clone(),
                actual_runtime: model.actual_runtime.clone(),
                single_time: model.single_time.clone(),
                theoretical_qty: model.theoretical_qty.clone(),
                actual_qty: model.actual_qty.clone(),
                total_weight: model.total_weight.clone(),
                unit_weight: model.unit_weight.clone(),
                tare_weight: model.tare_weight.clone(),
                capacity_rate: model.capacity_rate.clone(),
                time_rate: model.time_rate.clone(),
                downtime_duration: model.downtime_duration.clone(),
                adjustment_time: model.adjustment_time.clone(),
            },
            adjustment_master: model.adjustment_master.clone(),
        }
    }
}

impl RecordFields {
    fn apply_patch(&mut self, patch: RecordPatch) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        if let Some(date) = patch.date {
            self.date = date;
        }
        set(&mut self.name, patch.name.map(|v| v.trim().to_string()));
        set(&mut self.position, patch.position.map(|v| v.trim().to_string()));
        set(&mut self.product, patch.product.map(|v| v.trim().to_string()));
        set(&mut self.process, patch.process.map(|v| v.trim().to_string()));
        set(
            &mut self.adjustment_master,
            patch.adjustment_master.map(|v| v.trim().to_string()),
        );

        let m = &mut self.measurements;
        set(&mut m.theoretical_runtime, patch.theoretical_runtime);
        set(&mut m.actual_runtime, patch.actual_runtime);
        set(&mut m.single_time, patch.single_time);
        set(&mut m.theoretical_qty, patch.theoretical_qty);
        set(&mut m.actual_qty, patch.actual_qty);
        set(&mut m.total_weight, patch.total_weight);
        set(&mut m.unit_weight, patch.unit_weight);
        set(&mut m.tare_weight, patch.tare_weight);
        set(&mut m.capacity_rate, patch.capacity_rate);
        set(&mut m.time_rate, patch.time_rate);
        set(&mut m.downtime_duration, patch.downtime_duration);
        set(&mut m.adjustment_time, patch.adjustment_time);
    }

    fn write_to(self, active: &mut production_record::ActiveModel) {
        let m = self.measurements;
        active.date = Set(self.date);
        active.name = Set(self.name);
        active.position = Set(self.position);
        active.product = Set(self.product);
        active.process = Set(self.process);
        active.theoretical_runtime = Set(m.theoretical_runtime);
        active.actual_runtime = Set(m.actual_runtime);
        active.single_time = Set(m.single_time);
        active.theoretical_qty = Set(m.theoretical_qty);
        active.actual_qty = Set(m.actual_qty);
        active.total_weight = Set(m.total_weight);
        active.unit_weight = Set(m.unit_weight);
        active.tare_weight = Set(m.tare_weight);
        active.capacity_rate = Set(m.capacity_rate);
        active.time_rate = Set(m.time_rate);
        active.downtime_duration = Set(m.downtime_duration);
        active.adjustment_time = Set(m.adjustment_time);
        active.adjustment_master = Set(self.adjustment_master);
        active.updated_at = Set(Utc::now());
    }
}

/// Production record service
#[derive(Clone)]
pub struct RecordService {
    db: Arc<DatabaseConnection>,
    shift_minutes: i64,
    adjustment_master_position: String,
}

impl RecordService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        shift_minutes: i64,
        adjustment_master_position: impl Into<String>,
    ) -> Self {
        Self {
            db,
            shift_minutes,
            adjustment_master_position: adjustment_master_position.into(),
        }
    }

    /// Lists records matching every supplied filter, newest first
    #[instrument(skip(self))]
    pub async fn list_records(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<production_record::Model>, ServiceError> {
        filter
            .apply(RecordEntity::find())
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!("Failed to list production records: {}", e);
                ServiceError::db_error(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get_record(&self, id: i32) -> Result<production_record::Model, ServiceError> {
        RecordEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Production record {} not found", id)))
    }

    /// Creates a record and fills in its derived columns
    #[instrument(skip(self, input), fields(product = %input.product, process = %input.process))]
    pub async fn create_record(
        &self,
        input: RecordInput,
    ) -> Result<production_record::Model, ServiceError> {
        input.validate()?;

        let mut fields = RecordFields::from(input);
        self.prepare(&mut fields).await?;

        let now = Utc::now();
        let mut active = production_record::ActiveModel {
            created_at: Set(now),
            ..Default::default()
        };
        fields.write_to(&mut active);

        let created = active.insert(&*self.db).await.map_err(|e| {
            error!("Failed to create production record: {}", e);
            ServiceError::db_error(e)
        })?;

        counter!("prodtrack.records.created", 1);
        info!(record_id = created.id, "Production record created");
        Ok(created)
    }

    /// Applies a partial update and recomputes derived columns
    #[instrument(skip(self, patch))]
    pub async fn update_record(
        &self,
        id: i32,
        patch: RecordPatch,
    ) -> Result<production_record::Model, ServiceError> {
        patch.validate()?;

        let existing = self.get_record(id).await?;
        let mut fields = RecordFields::from(&existing);
        fields.apply_patch(patch);
        self.prepare(&mut fields).await?;

        let mut active: production_record::ActiveModel = existing.into();
        fields.write_to(&mut active);

        let updated = active.update(&*self.db).await.map_err(|e| {
            error!(record_id = id, "Failed to update production record: {}", e);
            ServiceError::db_error(e)
        })?;

        counter!("prodtrack.records.updated", 1);
        info!(record_id = id, "Production record updated");
        Ok(updated)
    }

    /// Moves a record to another process without touching anything else
    #[instrument(skip(self))]
    pub async fn update_record_process(
        &self,
        id: i32,
        process: &str,
    ) -> Result<production_record::Model, ServiceError> {
        let process = process.trim();
        if process.is_empty() {
            return Err(ServiceError::ValidationError(
                "process must not be blank".to_string(),
            ));
        }

        let existing = self.get_record(id).await?;
        let mut active: production_record::ActiveModel = existing.into();
        active.process = Set(process.to_string());
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(record_id = id, process = %process, "Production record moved to process");
        Ok(updated)
    }

    /// Deletes a record together with its comments
    #[instrument(skip(self))]
    pub async fn delete_record(&self, id: i32) -> Result<(), ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let record = RecordEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Production record {} not found", id)))?;

        let removed_comments = CommentEntity::delete_many()
            .filter(comment::Column::RecordId.eq(record.id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        RecordEntity::delete_by_id(record.id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        counter!("prodtrack.records.deleted", 1);
        info!(
            record_id = id,
            comments_removed = removed_comments.rows_affected,
            "Production record deleted"
        );
        Ok(())
    }

    /// Derives columns and enforces the cross-field rules shared by writes
    async fn prepare(&self, fields: &mut RecordFields) -> Result<(), ServiceError> {
        for (label, value) in [
            ("name", &fields.name),
            ("product", &fields.product),
            ("process", &fields.process),
        ] {
            if value.is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "{} must not be blank",
                    label
                )));
            }
        }

        if !fields.adjustment_master.is_empty() {
            self.ensure_adjustment_master(&fields.adjustment_master)
                .await?;
        }

        apply_derived_fields(&mut fields.measurements, self.shift_minutes);

        if let Some(qty) = parse_quantity(&fields.measurements.actual_qty) {
            let derived = !fields.measurements.unit_weight.trim().is_empty();
            check_actual_quantity(qty, derived)?;
        }

        Ok(())
    }

    async fn ensure_adjustment_master(&self, name: &str) -> Result<(), ServiceError> {
        let employee = EmployeeEntity::find()
            .filter(employee::Column::Name.eq(name))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        match employee {
            Some(employee) if employee.holds_position(&self.adjustment_master_position) => Ok(()),
            Some(_) => Err(ServiceError::ValidationError(format!(
                "employee '{}' is not an {}",
                name, self.adjustment_master_position
            ))),
            None => Err(ServiceError::ValidationError(format!(
                "adjustment master '{}' is not a known employee",
                name
            ))),
        }
    }
}

/// Actual quantities are whole, non-negative counts. Text that does not
/// parse is left alone and counts as zero downstream.
fn check_actual_quantity(qty: Decimal, derived: bool) -> Result<(), ServiceError> {
    if qty < Decimal::ZERO {
        warn!(actual_qty = %qty, derived, "Rejected negative actual quantity");
        let message = if derived {
            format!(
                "actual quantity must not be negative (got {}); tare weight exceeds total weight",
                qty
            )
        } else {
            format!("actual quantity must not be negative (got {})", qty)
        };
        return Err(ServiceError::ValidationError(message));
    }
    if !qty.fract().is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "actual quantity must be a whole number (got {})",
            qty
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RecordInput {
        RecordInput {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            name: " Li Wei ".into(),
            position: "operator".into(),
            product: "A".into(),
            process: "cut".into(),
            theoretical_runtime: String::new(),
            actual_runtime: String::new(),
            single_time: String::new(),
            theoretical_qty: String::new(),
            actual_qty: "40".into(),
            total_weight: String::new(),
            unit_weight: String::new(),
            tare_weight: String::new(),
            capacity_rate: String::new(),
            time_rate: String::new(),
            downtime_duration: String::new(),
            adjustment_time: String::new(),
            adjustment_master: String::new(),
        }
    }

    fn rejection(qty: Decimal, derived: bool) -> String {
        match check_actual_quantity(qty, derived) {
            Err(ServiceError::ValidationError(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn negative_quantity_message_names_its_cause() {
        let typed = rejection(Decimal::from(-3), false);
        assert_eq!(typed, "actual quantity must not be negative (got -3)");

        let weighed = rejection(Decimal::from(-5), true);
        assert!(weighed.contains("tare weight exceeds total weight"));
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let message = rejection(Decimal::new(125, 1), false);
        assert_eq!(message, "actual quantity must be a whole number (got 12.5)");
        assert!(check_actual_quantity(Decimal::from(40), false).is_ok());
        assert!(check_actual_quantity(Decimal::new(400, 1), false).is_ok());
        assert!(check_actual_quantity(Decimal::ZERO, true).is_ok());
    }

    #[test]
    fn input_fields_are_trimmed() {
        let fields = RecordFields::from(input());
        assert_eq!(fields.name, "Li Wei");
        assert_eq!(fields.measurements.actual_qty, "40");
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut fields = RecordFields::from(input());
        fields.apply_patch(RecordPatch {
            process: Some(" pack ".into()),
            downtime_duration: Some("15".into()),
            ..Default::default()
        });

        assert_eq!(fields.process, "pack");
        assert_eq!(fields.measurements.downtime_duration, "15");
        assert_eq!(fields.product, "A");
        assert_eq!(fields.measurements.actual_qty, "40");
    }

    #[test]
    fn blank_required_names_fail_validation() {
        let mut bad = input();
        bad.process = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn record_input_accepts_missing_measurements() {
        let parsed: RecordInput = serde_json::from_value(serde_json::json!({
            "date": "2024-06-03",
            "name": "Li Wei",
            "product": "A",
            "process": "cut"
        }))
        .unwrap();
        assert_eq!(parsed.actual_qty, "");
        assert_eq!(parsed.adjustment_master, "");
    }
}
