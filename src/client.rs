//! Blocking client for the prediction API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::domain::RawRecord;
use crate::error::AppError;
use crate::service::{CategoryOptions, HealthStatus, PredictResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(5, format!("Failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health(&self) -> Result<HealthStatus, AppError> {
        self.get_json("/health")
    }

    pub fn options(&self) -> Result<CategoryOptions, AppError> {
        self.get_json("/options")
    }

    /// Submit one record.
    ///
    /// Error envelopes from the server come back as `Ok(PredictResponse::Error)`;
    /// `Err` means the request itself failed (connection, unexpected body).
    pub fn predict(&self, record: &RawRecord) -> Result<PredictResponse, AppError> {
        let url = format!("{}/predict", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(record)
            .send()
            .map_err(|e| AppError::new(5, format!("Connection error: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| AppError::new(5, format!("Failed to read API response: {e}")))?;

        serde_json::from_str::<PredictResponse>(&body)
            .map_err(|_| AppError::new(5, format!("API Error: {status}")))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::new(5, format!("Connection error: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(5, format!("API Error: {} ({url})", resp.status())));
        }

        resp.json::<T>()
            .map_err(|e| AppError::new(5, format!("Invalid API response from {url}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn unreachable_api_is_a_connection_error() {
        // Reserve a free port, then release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(format!("http://{addr}")).unwrap();
        let err = client.health().unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().starts_with("Connection error"), "{err}");
    }
}
