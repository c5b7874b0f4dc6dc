use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use crate::{
    entities::production_record::{self, Entity as RecordEntity},
    errors::ServiceError,
    services::{completion::parse_quantity, derived::parse_percentage, records::RecordFilter},
};

/// Aggregate figures over a filtered set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordStatistics {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_actual_qty: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub avg_capacity_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub avg_time_rate: Decimal,
    pub total_records: u64,
}

/// Sums quantities and averages the rates that parse.
pub fn summarize(records: &[production_record::Model]) -> RecordStatistics {
    let total_actual_qty = records
        .iter()
        .filter_map(|r| parse_quantity(&r.actual_qty))
        .fold(Decimal::ZERO, Decimal::saturating_add);

    RecordStatistics {
        total_actual_qty: total_actual_qty.normalize(),
        avg_capacity_rate: average(records.iter().map(|r| r.capacity_rate.as_str())),
        avg_time_rate: average(records.iter().map(|r| r.time_rate.as_str())),
        total_records: records.len() as u64,
    }
}

fn average<'a>(rates: impl Iterator<Item = &'a str>) -> Decimal {
    let (sum, count) = rates
        .filter_map(parse_percentage)
        .fold((Decimal::ZERO, 0u32), |(sum, count), rate| {
            (sum.saturating_add(rate), count + 1)
        });
    if count == 0 {
        return Decimal::ZERO;
    }
    sum.checked_div(Decimal::from(count))
        .map(|avg| {
            avg.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        })
        .unwrap_or(Decimal::ZERO)
}

#[derive(Clone)]
pub struct StatisticsService {
    db: Arc<DatabaseConnection>,
}

impl StatisticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_statistics(
        &self,
        filter: &RecordFilter,
    ) -> Result<RecordStatistics, ServiceError> {
        let records = filter
            .apply(RecordEntity::find())
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(summarize(&records))
    }
}
