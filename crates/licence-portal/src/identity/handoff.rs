use serde::Deserialize;

use super::exchange::{ClaimsExchangeRequest, ClaimsExchanger, IdentityClaims, IdentityError};
use crate::config::IdentityConfig;

/// Query parameters carried on the provider's redirect back to us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Extracts the hand-off parameters from a raw redirect query string.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                "error_description" => params.error_description = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Progression of the identity hand-off.
///
/// `Loading` exists only until the redirect parameters are inspected; the
/// terminal states are `Loaded` and `Failed`. A failure is blocking: the
/// citizen restarts login, there is no automatic retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffState {
    Loading,
    Authenticating,
    Loaded(IdentityClaims),
    Failed { code: String, message: String },
}

impl HandoffState {
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Runs the hand-off to a terminal state.
///
/// A provider-reported `error` parameter, or an absent code, resolves
/// without ever touching the exchanger.
pub async fn resolve<X>(
    params: &CallbackParams,
    config: &IdentityConfig,
    exchanger: &X,
) -> HandoffState
where
    X: ClaimsExchanger + ?Sized,
{
    if let Some(error) = &params.error {
        let message = params
            .error_description
            .clone()
            .unwrap_or_else(|| "authentication failed".to_string());
        return HandoffState::failed(error.clone(), message);
    }

    let code = match &params.code {
        Some(code) => code.clone(),
        None => {
            return HandoffState::failed(
                "code_missing",
                IdentityError::MissingCode.to_string(),
            )
        }
    };

    let request = ClaimsExchangeRequest::new(code, config);
    match exchanger.exchange(&request).await {
        Ok(claims) => HandoffState::Loaded(claims),
        Err(err) => {
            let code = match &err {
                IdentityError::ExchangeStatus(status) => format!("exchange_status_{status}"),
                IdentityError::Transport(_) => "exchange_transport".to_string(),
                IdentityError::MalformedClaims(_) => "malformed_claims".to_string(),
                IdentityError::Provider { code, .. } => code.clone(),
                IdentityError::MissingCode => "code_missing".to_string(),
            };
            HandoffState::Failed {
                code,
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn identity_config() -> IdentityConfig {
        IdentityConfig {
            ui_base_url: "https://idp.example".to_string(),
            authorize_endpoint: "/authorize".to_string(),
            relying_party_url: "http://localhost:8888".to_string(),
            redirect_uri: "http://localhost:5000/userprofile".to_string(),
            client_id: "client-1".to_string(),
            scope: "openid profile".to_string(),
            acr_values: "acr".to_string(),
            claims_request: serde_json::json!({}),
            claims_locales: "en".to_string(),
            display: "page".to_string(),
            prompt: "consent".to_string(),
            max_age: 21,
            ui_locales: "en".to_string(),
            nonce: "nonce".to_string(),
            state: "state".to_string(),
        }
    }

    #[derive(Default)]
    struct CountingExchanger {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ClaimsExchanger for CountingExchanger {
        async fn exchange(
            &self,
            request: &ClaimsExchangeRequest,
        ) -> Result<IdentityClaims, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(IdentityError::ExchangeStatus(502));
            }
            assert_eq!(request.grant_type, "authorization_code");
            Ok(IdentityClaims {
                name: "Kasun Asanka Silva".to_string(),
                sub: "sub-123".to_string(),
                birthdate: Some("1999-09-15".to_string()),
                phone_number: Some("0771234567".to_string()),
                email: Some("kasun.silva@email.com".to_string()),
                gender: Some("Male".to_string()),
                picture: None,
            })
        }
    }

    #[test]
    fn parses_code_and_error_from_query() {
        let params = CallbackParams::from_query("?code=abc123&state=xyz");
        assert_eq!(params.code.as_deref(), Some("abc123"));
        assert!(params.error.is_none());

        let params =
            CallbackParams::from_query("error=access_denied&error_description=user%20declined");
        assert_eq!(params.error.as_deref(), Some("access_denied"));
        assert_eq!(params.error_description.as_deref(), Some("user declined"));
    }

    #[tokio::test]
    async fn provider_error_never_reaches_the_exchanger() {
        let exchanger = CountingExchanger::default();
        let params = CallbackParams::from_query("?error=access_denied");

        let state = resolve(&params, &identity_config(), &exchanger).await;

        match state {
            HandoffState::Failed { code, .. } => assert_eq!(code, "access_denied"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_code_is_its_own_failure() {
        let exchanger = CountingExchanger::default();
        let params = CallbackParams::default();

        let state = resolve(&params, &identity_config(), &exchanger).await;

        match state {
            HandoffState::Failed { code, .. } => assert_eq!(code, "code_missing"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_exchange_loads_claims() {
        let exchanger = CountingExchanger::default();
        let params = CallbackParams::from_query("code=onetime");

        let state = resolve(&params, &identity_config(), &exchanger).await;

        match state {
            HandoffState::Loaded(claims) => {
                assert_eq!(claims.sub, "sub-123");
                assert_eq!(claims.name, "Kasun Asanka Silva");
            }
            other => panic!("expected loaded claims, got {other:?}"),
        }
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exchange_failure_maps_to_status_code() {
        let exchanger = CountingExchanger {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let params = CallbackParams::from_query("code=onetime");

        let state = resolve(&params, &identity_config(), &exchanger).await;

        match state {
            HandoffState::Failed { code, .. } => assert_eq!(code, "exchange_status_502"),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
