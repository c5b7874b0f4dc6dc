pub mod common;
pub mod employees;
pub mod plans;
pub mod processes;
pub mod products;
pub mod records;
pub mod statistics;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    catalog::{ProcessService, ProductService},
    comments::CommentService,
    employees::EmployeeService,
    plans::PlanService,
    records::RecordService,
    statistics::StatisticsService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub records: Arc<RecordService>,
    pub comments: Arc<CommentService>,
    pub plans: Arc<PlanService>,
    pub statistics: Arc<StatisticsService>,
    pub employees: Arc<EmployeeService>,
    pub processes: Arc<ProcessService>,
    pub products: Arc<ProductService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, config: &AppConfig) -> Self {
        Self {
            records: Arc::new(RecordService::new(
                db.clone(),
                config.standard_shift_minutes,
                config.adjustment_master_position.clone(),
            )),
            comments: Arc::new(CommentService::new(db.clone())),
            plans: Arc::new(PlanService::new(db.clone())),
            statistics: Arc::new(StatisticsService::new(db.clone())),
            employees: Arc::new(EmployeeService::new(db.clone())),
            processes: Arc::new(ProcessService::new(db.clone())),
            products: Arc::new(ProductService::new(db)),
        }
    }
}
