use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One operator-entered observation of output.
///
/// Numeric columns are kept as entered text: blanks are a legitimate state
/// and derived values are rendered strings such as `"87.50%"`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "production_records")]
#[schema(as = ProductionRecord)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[schema(value_type = String, format = Date)]
    pub date: Date,
    /// Employee name at the time of entry
    pub name: String,
    pub position: String,
    pub product: String,
    pub process: String,
    pub theoretical_runtime: String,
    pub actual_runtime: String,
    pub single_time: String,
    pub theoretical_qty: String,
    pub actual_qty: String,
    pub total_weight: String,
    pub unit_weight: String,
    pub tare_weight: String,
    pub capacity_rate: String,
    pub time_rate: String,
    pub downtime_duration: String,
    pub adjustment_time: String,
    pub adjustment_master: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeUtc,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
