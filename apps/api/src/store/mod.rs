/// Record Store Gateway — the single point of entry for all record-store
/// calls in Grove.
///
/// ARCHITECTURAL RULE: no other module may talk to the store endpoint
/// directly. Workflows depend on the `RecordStore` trait and receive an
/// implementation through `AppState`.
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
pub mod memory;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Unique-constraint violation on insert. The ingestion workflow
    /// treats this as the duplicate-submission signal.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Record not found")]
    NotFound,

    #[error("Store returned an empty representation")]
    EmptyRepresentation,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A conjunctive equality (or not-equal) predicate over a named field.
/// `Neq("id", nil-uuid)` is the unconditional-scan form used by purge-all.
#[derive(Debug, Clone)]
pub enum Filter {
    Eq(&'static str, String),
    Neq(&'static str, String),
}

impl Filter {
    fn to_query_pair(&self) -> (&'static str, String) {
        match self {
            Filter::Eq(field, value) => (field, format!("eq.{value}")),
            Filter::Neq(field, value) => (field, format!("neq.{value}")),
        }
    }
}

/// Minimal CRUD-with-filter contract against the external record store.
///
/// The gateway does not retry and does not interpret error codes beyond
/// the conflict and not-found mappings documented on each method.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records matching every filter, in the store's natural order.
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError>;

    /// First record matching every filter; `StoreError::NotFound` when none do.
    async fn select_one(&self, table: &str, filters: &[Filter]) -> Result<Value, StoreError>;

    /// Inserts one record and returns the stored row (with generated id).
    /// A unique-constraint violation maps to `StoreError::Conflict`.
    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError>;

    /// Deletes every record matching the filters.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError>;
}

/// PostgREST-dialect implementation speaking to the managed store's REST
/// endpoint. Filters become `field=eq.value` query parameters; inserts ask
/// for `return=representation` to get the stored row back.
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}

impl PostgrestStore {
    pub fn new(endpoint: &str, service_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: rest_base(endpoint),
            service_key,
        }
    }

    fn request(&self, method: Method, table: &str, filters: &[Filter]) -> reqwest::RequestBuilder {
        let pairs: Vec<(&str, String)> = filters.iter().map(Filter::to_query_pair).collect();
        self.client
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(&pairs)
    }
}

/// Maps a non-success response to a `StoreError`, passing the remote
/// message through verbatim. 409 is surfaced as `Conflict`.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<PostgrestError>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    if status.as_u16() == 409 {
        return Err(StoreError::Conflict(message));
    }
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        let response = self
            .request(Method::GET, table, filters)
            .query(&[("select", "*")])
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        debug!("select {table}: {} rows", rows.len());
        Ok(rows)
    }

    async fn select_one(&self, table: &str, filters: &[Filter]) -> Result<Value, StoreError> {
        let response = self
            .request(Method::GET, table, filters)
            .query(&[("select", "*"), ("limit", "1")])
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }

    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        let response = self
            .request(Method::POST, table, &[])
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        debug!("insert {table}: stored");
        rows.into_iter().next().ok_or(StoreError::EmptyRepresentation)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        let response = self.request(Method::DELETE, table, filters).send().await?;
        check(response).await?;
        debug!("delete {table}: done");
        Ok(())
    }
}

/// PostgREST base is `{endpoint}/rest/v1`, tolerant of a trailing slash.
fn rest_base(endpoint: &str) -> String {
    format!("{}/rest/v1", endpoint.trim_end_matches('/'))
}
