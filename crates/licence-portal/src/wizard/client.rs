use async_trait::async_trait;
use serde_json::json;

use super::categories::LicenceCategory;
use super::domain::{MedicalCertificate, TestResult};
use super::records::{RecordsClient, RecordsError};
use crate::config::UpstreamConfig;

/// Production records client talking to the department's REST backend.
pub struct HttpRecordsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecordsClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.records_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_by_sub<T>(&self, path: &str, sub: &str) -> Result<T, RecordsError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(&json!({ "sub": sub }))
            .send()
            .await
            .map_err(|err| RecordsError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(RecordsError::Status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| RecordsError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl RecordsClient for HttpRecordsClient {
    async fn medical_certificate(&self, sub: &str) -> Result<MedicalCertificate, RecordsError> {
        self.post_by_sub("medical-certificate", sub).await
    }

    async fn written_test(&self, sub: &str) -> Result<TestResult, RecordsError> {
        self.post_by_sub("written-test", sub).await
    }

    async fn practical_test(&self, sub: &str) -> Result<TestResult, RecordsError> {
        self.post_by_sub("practical-test", sub).await
    }

    async fn licence_categories(&self) -> Result<Vec<LicenceCategory>, RecordsError> {
        let response = self
            .client
            .get(format!("{}/licence-categories", self.base_url))
            .send()
            .await
            .map_err(|err| RecordsError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(RecordsError::Status(response.status().as_u16()));
        }

        response
            .json::<Vec<LicenceCategory>>()
            .await
            .map_err(|err| RecordsError::Malformed(err.to_string()))
    }
}
