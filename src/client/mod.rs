//! HTTP client for the production tracking API.
//!
//! Completion figures come from the server; nothing here recomputes them.

mod dashboard;

pub use dashboard::{AppSnapshot, BatchDeleteReport, Dashboard};

use futures::future::join_all;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::entities::{employee, process, product, production_record};
use crate::services::{
    plans::{CompletionReport, PlanView},
    records::RecordFilter,
    statistics::RecordStatistics,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Success envelope written by the server
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Ids a batch delete managed to remove, and those it did not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDeleteOutcome {
    pub deleted: Vec<i32>,
    pub failed: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct TrackerClient {
    http: reqwest::Client,
    base_url: String,
}

impl TrackerClient {
    /// `base_url` is the server root, e.g. `http://localhost:8080`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self::with_http_client(http, base_url))
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut request = self.http.request(Method::GET, self.url(path));
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode(format!("response to {} carried no data", path)))
    }

    #[instrument(skip(self))]
    pub async fn list_records(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<production_record::Model>, ClientError> {
        self.fetch("/records", Some(filter)).await
    }

    pub async fn list_plans(&self) -> Result<Vec<PlanView>, ClientError> {
        self.fetch::<_, ()>("/production-plans", None).await
    }

    pub async fn list_employees(&self) -> Result<Vec<employee::Model>, ClientError> {
        self.fetch::<_, ()>("/employees", None).await
    }

    pub async fn list_processes(&self) -> Result<Vec<process::Model>, ClientError> {
        self.fetch::<_, ()>("/processes", None).await
    }

    pub async fn list_products(&self) -> Result<Vec<product::Model>, ClientError> {
        self.fetch::<_, ()>("/products", None).await
    }

    #[instrument(skip(self))]
    pub async fn completion(&self, product: &str) -> Result<CompletionReport, ClientError> {
        self.fetch("/completion", Some(&[("product", product)])).await
    }

    #[instrument(skip(self))]
    pub async fn statistics(&self, filter: &RecordFilter) -> Result<RecordStatistics, ClientError> {
        self.fetch("/statistics", Some(filter)).await
    }

    #[instrument(skip(self))]
    pub async fn delete_record(&self, id: i32) -> Result<(), ClientError> {
        let request = self
            .http
            .request(Method::DELETE, self.url(&format!("/records/{}", id)));
        let response = self.send(request).await?;
        debug!(record_id = id, status = %response.status(), "record deleted");
        Ok(())
    }

    /// Fetches everything a dashboard shows, concurrently.
    ///
    /// Any single failure fails the whole load.
    #[instrument(skip(self))]
    pub async fn load_snapshot(&self) -> Result<AppSnapshot, ClientError> {
        let filter = RecordFilter::default();
        let (records, plans, employees, processes, products) = tokio::try_join!(
            self.list_records(&filter),
            self.list_plans(),
            self.list_employees(),
            self.list_processes(),
            self.list_products(),
        )?;

        Ok(AppSnapshot {
            records,
            plans,
            employees,
            processes,
            products,
            loaded_at: chrono::Utc::now(),
        })
    }

    /// Deletes every id concurrently. Nothing is rolled back when some fail.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_delete(&self, ids: &[i32]) -> BatchDeleteOutcome {
        let results = join_all(ids.iter().map(|&id| async move {
            (id, self.delete_record(id).await)
        }))
        .await;

        let mut outcome = BatchDeleteOutcome::default();
        for (id, result) in results {
            match result {
                Ok(()) => outcome.deleted.push(id),
                Err(e) => {
                    warn!(record_id = id, error = %e, "batch delete entry failed");
                    outcome.failed.push(id);
                }
            }
        }
        outcome
    }
}

/// True for statuses that mean the record is already gone
pub fn is_not_found(error: &ClientError) -> bool {
    error.status() == Some(StatusCode::NOT_FOUND.as_u16())
}
