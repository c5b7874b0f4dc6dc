use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{BatchDeleteOutcome, ClientError, TrackerClient};
use crate::entities::{employee, process, product, production_record};
use crate::services::plans::{CompletionView, PlanView};

/// Everything the dashboard renders, as of one load.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub records: Vec<production_record::Model>,
    pub plans: Vec<PlanView>,
    pub employees: Vec<employee::Model>,
    pub processes: Vec<process::Model>,
    pub products: Vec<product::Model>,
    pub loaded_at: DateTime<Utc>,
}

impl AppSnapshot {
    pub fn plan_for(&self, product: &str) -> Option<&PlanView> {
        self.plans.iter().find(|plan| plan.product == product)
    }

    /// Server-computed completion for `product`; `None` when it has no plan
    pub fn completion_for(&self, product: &str) -> Option<&[CompletionView]> {
        self.plan_for(product).map(|plan| plan.completion.as_slice())
    }
}

/// Result of a dashboard batch delete and the reload that follows it.
#[derive(Debug)]
pub struct BatchDeleteReport {
    pub outcome: BatchDeleteOutcome,
    pub reload: Result<Arc<AppSnapshot>, ClientError>,
}

/// Shared, periodically refreshed view of the server state.
///
/// `reload` is the only place the snapshot is replaced. A failed reload
/// leaves the previous snapshot in place; concurrent reloads resolve as
/// last write wins.
pub struct Dashboard {
    client: TrackerClient,
    snapshot: RwLock<Option<Arc<AppSnapshot>>>,
}

impl Dashboard {
    pub fn new(client: TrackerClient) -> Self {
        Self {
            client,
            snapshot: RwLock::new(None),
        }
    }

    /// The most recent successful load, if any
    pub async fn current(&self) -> Option<Arc<AppSnapshot>> {
        self.snapshot.read().await.clone()
    }

    pub async fn reload(&self) -> Result<Arc<AppSnapshot>, ClientError> {
        match self.client.load_snapshot().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.snapshot.write().await = Some(snapshot.clone());
                info!(
                    records = snapshot.records.len(),
                    plans = snapshot.plans.len(),
                    "dashboard snapshot refreshed"
                );
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "dashboard refresh failed; keeping previous snapshot");
                Err(e)
            }
        }
    }

    /// Deletes the ids, then reloads once regardless of individual failures.
    ///
    /// The outcome is returned even when the reload fails, since deleted
    /// records stay deleted either way.
    pub async fn delete_records(&self, ids: &[i32]) -> BatchDeleteReport {
        let outcome = self.client.batch_delete(ids).await;
        let reload = self.reload().await;
        BatchDeleteReport { outcome, reload }
    }

    /// Calls `reload` every `period` until the handle is aborted
    pub fn spawn_refresh(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // failures are logged inside reload
                let _ = self.reload().await;
            }
        })
    }
}
