use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored shape of a plan: four fixed process/quantity slots.
///
/// Services convert to [`crate::services::completion::ProductionPlan`], which
/// holds the slots as an ordered list.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub product: String,
    pub process1: Option<String>,
    pub qty1: i32,
    pub process2: Option<String>,
    pub qty2: i32,
    pub process3: Option<String>,
    pub qty3: i32,
    pub process4: Option<String>,
    pub qty4: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Slot pairs in slot order, blanks included
    pub fn slot_pairs(&self) -> [(Option<&str>, i32); 4] {
        [
            (self.process1.as_deref(), self.qty1),
            (self.process2.as_deref(), self.qty2),
            (self.process3.as_deref(), self.qty3),
            (self.process4.as_deref(), self.qty4),
        ]
    }
}
