//! HTTP client for the sheet service.

use std::time::Duration;

use async_trait::async_trait;

use crate::payload::{CountPayload, RowPayload, TablePayload, TableUpdate};
use pledge_store::{StoreError, TabularStore};
use pledge_types::Signature;

/// Default timeout for sheet requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Signature store backed by a remote worksheet.
pub struct SheetsStore {
    base_url: String,
    worksheet: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl SheetsStore {
    /// Create a store addressing `worksheet` on the service at `base_url`.
    pub fn new(base_url: &str, worksheet: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            worksheet: worksheet.to_string(),
            token: None,
            client,
        }
    }

    /// Attach a bearer token for authenticated services.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn rows_url(&self) -> String {
        format!("{}/worksheets/{}/rows", self.base_url, self.worksheet)
    }

    fn count_url(&self) -> String {
        format!("{}/worksheets/{}/count", self.base_url, self.worksheet)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if !response.status().is_success() {
            return Err(StoreError::Backend(format!(
                "HTTP status {} from sheet service",
                response.status()
            )));
        }
        Ok(response)
    }
}

fn classify(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Backend(format!("sheet request timed out: {e}"))
    } else if e.is_connect() {
        StoreError::Backend(format!("sheet service connection failed: {e}"))
    } else {
        StoreError::Backend(e.to_string())
    }
}

#[async_trait]
impl TabularStore for SheetsStore {
    async fn read_all(&self) -> Result<Vec<Signature>, StoreError> {
        let response = self
            .authorized(self.client.get(self.rows_url()))
            .send()
            .await
            .map_err(classify)?;
        let response = Self::check_status(response).await?;
        let table: TablePayload = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        table
            .rows
            .into_iter()
            .map(RowPayload::into_signature)
            .collect()
    }

    async fn overwrite_all(&self, rows: &[Signature]) -> Result<(), StoreError> {
        let update = TableUpdate {
            rows: rows.iter().map(RowPayload::from).collect(),
        };
        let response = self
            .authorized(self.client.put(self.rows_url()))
            .json(&update)
            .send()
            .await
            .map_err(classify)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn row_count(&self) -> Result<u64, StoreError> {
        let response = self
            .authorized(self.client.get(self.count_url()))
            .send()
            .await
            .map_err(classify)?;
        let response = Self::check_status(response).await?;
        let payload: CountPayload = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(payload.count)
    }
}
