use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Free-text annotation on one cell of a production record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "record_comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub record_id: i32,
    pub column_key: String,
    pub comment_text: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::production_record::Entity",
        from = "Column::RecordId",
        to = "super::production_record::Column::Id",
        on_delete = "Cascade"
    )]
    ProductionRecord,
}

impl Related<super::production_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Record columns that accept comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CommentColumn {
    DowntimeDuration,
    AdjustmentTime,
}
