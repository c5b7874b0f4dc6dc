pub mod comment;
pub mod employee;
pub mod process;
pub mod product;
pub mod production_plan;
pub mod production_record;

pub use comment::{Entity as Comment, Model as CommentModel};
pub use employee::{Entity as Employee, Model as EmployeeModel};
pub use process::{Entity as Process, Model as ProcessModel};
pub use product::{Entity as Product, Model as ProductModel};
pub use production_plan::{Entity as ProductionPlan, Model as ProductionPlanModel};
pub use production_record::{Entity as ProductionRecord, Model as ProductionRecordModel};
