use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;

/// Claims returned by the provider after a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub name: String,
    pub sub: String,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Single POST exchanging the one-time authorization code for claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimsExchangeRequest {
    pub code: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub grant_type: &'static str,
}

impl ClaimsExchangeRequest {
    pub fn new(code: impl Into<String>, config: &IdentityConfig) -> Self {
        Self {
            code: code.into(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            grant_type: "authorization_code",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider reported {code}: {message}")]
    Provider { code: String, message: String },
    #[error("authorization code missing from redirect")]
    MissingCode,
    #[error("claims exchange returned status {0}")]
    ExchangeStatus(u16),
    #[error("claims exchange transport failure: {0}")]
    Transport(String),
    #[error("claims payload malformed: {0}")]
    MalformedClaims(String),
}

/// Capability seam for the code-for-claims exchange so wizard logic never
/// touches the transport directly.
#[async_trait]
pub trait ClaimsExchanger: Send + Sync {
    async fn exchange(
        &self,
        request: &ClaimsExchangeRequest,
    ) -> Result<IdentityClaims, IdentityError>;
}

/// Production exchanger talking to the relying-party delegate endpoint.
pub struct HttpClaimsExchanger {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClaimsExchanger {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.claims_exchange_endpoint(),
        }
    }
}

#[async_trait]
impl ClaimsExchanger for HttpClaimsExchanger {
    async fn exchange(
        &self,
        request: &ClaimsExchangeRequest,
    ) -> Result<IdentityClaims, IdentityError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| IdentityError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::ExchangeStatus(response.status().as_u16()));
        }

        response
            .json::<IdentityClaims>()
            .await
            .map_err(|err| IdentityError::MalformedClaims(err.to_string()))
    }
}
