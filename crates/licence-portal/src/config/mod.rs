use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Claims request template forwarded verbatim to the identity provider.
const DEFAULT_CLAIMS_REQUEST: &str = r#"{"userinfo":{"given_name":{"essential":true},"phone_number":{"essential":false},"email":{"essential":true},"picture":{"essential":false},"gender":{"essential":false},"birthdate":{"essential":false},"address":{"essential":false}},"id_token":{}}"#;

/// Top-level configuration for the application, loaded once at startup and
/// handed by reference to every component that needs it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub identity: IdentityConfig,
    pub upstream: UpstreamConfig,
    pub wizard: WizardPolicy,
    pub payment: PaymentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            identity: IdentityConfig::load()?,
            upstream: UpstreamConfig::load(),
            wizard: WizardPolicy::load(),
            payment: PaymentConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Parameters for the national digital-identity provider integration.
///
/// The hosted sign-in button and the authorization endpoint belong to the
/// provider; this service only assembles the widget's init payload and the
/// claims-exchange request from these values. Nonce and state are issued by
/// the relying-party registration, not computed here.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub ui_base_url: String,
    pub authorize_endpoint: String,
    pub relying_party_url: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub scope: String,
    pub acr_values: String,
    pub claims_request: serde_json::Value,
    pub claims_locales: String,
    pub display: String,
    pub prompt: String,
    pub max_age: u32,
    pub ui_locales: String,
    pub nonce: String,
    pub state: String,
}

impl IdentityConfig {
    fn load() -> Result<Self, ConfigError> {
        let claims_raw =
            env::var("IDP_CLAIMS_REQUEST").unwrap_or_else(|_| DEFAULT_CLAIMS_REQUEST.to_string());
        let claims_request = serde_json::from_str(&claims_raw)
            .map_err(|_| ConfigError::InvalidClaimsRequest { value: claims_raw })?;

        let max_age = env::var("IDP_MAX_AGE")
            .unwrap_or_else(|_| "21".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidMaxAge)?;

        Ok(Self {
            ui_base_url: env::var("IDP_UI_BASE_URL")
                .unwrap_or_else(|_| "https://esignet.sdec.mosip.net".to_string()),
            authorize_endpoint: env::var("IDP_AUTHORIZE_ENDPOINT")
                .unwrap_or_else(|_| "/authorize".to_string()),
            relying_party_url: env::var("RELYING_PARTY_URL")
                .unwrap_or_else(|_| "http://localhost:8888".to_string()),
            redirect_uri: env::var("IDP_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:5000/userprofile".to_string()),
            client_id: env::var("IDP_CLIENT_ID")
                .unwrap_or_else(|_| "licence-portal-dev".to_string()),
            scope: env::var("IDP_SCOPE")
                .unwrap_or_else(|_| "openid profile resident-service".to_string()),
            acr_values: env::var("IDP_ACR_VALUES").unwrap_or_else(|_| {
                "mosip:idp:acr:generated-code mosip:idp:acr:biometrics mosip:idp:acr:static-code"
                    .to_string()
            }),
            claims_request,
            claims_locales: env::var("IDP_CLAIMS_LOCALES").unwrap_or_else(|_| "en".to_string()),
            display: env::var("IDP_DISPLAY").unwrap_or_else(|_| "page".to_string()),
            prompt: env::var("IDP_PROMPT").unwrap_or_else(|_| "consent".to_string()),
            max_age,
            ui_locales: env::var("IDP_UI_LOCALES").unwrap_or_else(|_| "en".to_string()),
            nonce: env::var("IDP_NONCE").unwrap_or_else(|_| "ers24WL8GVsa".to_string()),
            state: env::var("IDP_STATE").unwrap_or_else(|_| "ptOO76SD".to_string()),
        })
    }

    /// Full authorization URI for the widget payload.
    pub fn authorize_uri(&self) -> String {
        format!("{}{}", self.ui_base_url, self.authorize_endpoint)
    }

    /// Endpoint that swaps an authorization code for identity claims.
    pub fn claims_exchange_endpoint(&self) -> String {
        format!("{}/delegate/fetchUserInfo", self.relying_party_url)
    }
}

/// Base URLs for the licensing department's backend services.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub records_base_url: String,
}

impl UpstreamConfig {
    fn load() -> Self {
        Self {
            records_base_url: env::var("RECORDS_API_URL")
                .unwrap_or_else(|_| "http://localhost:8888/api".to_string()),
        }
    }
}

/// Wizard navigation policy.
///
/// The observed flow lets the citizen continue past failed record fetches;
/// `gate_on_records` turns that into a hard gate on leaving the records step.
#[derive(Debug, Clone, Copy, Default)]
pub struct WizardPolicy {
    pub gate_on_records: bool,
}

impl WizardPolicy {
    fn load() -> Self {
        let gate_on_records = env::var("WIZARD_GATE_ON_RECORDS")
            .map(|value| matches!(value.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);
        Self { gate_on_records }
    }
}

/// Merchant defaults applied when the payment redirect omits parameters.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub amount: f64,
    pub currency: String,
    pub merchant_name: String,
    pub merchant_id: String,
}

impl PaymentConfig {
    fn load() -> Result<Self, ConfigError> {
        let amount = env::var("PAYMENT_AMOUNT")
            .unwrap_or_else(|_| "99.99".to_string())
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidAmount)?;

        Ok(Self {
            amount,
            currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "LKR".to_string()),
            merchant_name: env::var("PAYMENT_MERCHANT_NAME")
                .unwrap_or_else(|_| "Department of Motor Traffic".to_string()),
            merchant_id: env::var("PAYMENT_MERCHANT_ID").unwrap_or_else(|_| "DMT".to_string()),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMaxAge,
    InvalidAmount,
    InvalidClaimsRequest { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMaxAge => write!(f, "IDP_MAX_AGE must be a non-negative integer"),
            ConfigError::InvalidAmount => write!(f, "PAYMENT_AMOUNT must be a decimal number"),
            ConfigError::InvalidClaimsRequest { value } => {
                write!(f, "IDP_CLAIMS_REQUEST is not valid JSON: {}", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "IDP_CLAIMS_REQUEST",
            "IDP_MAX_AGE",
            "WIZARD_GATE_ON_RECORDS",
            "PAYMENT_AMOUNT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.wizard.gate_on_records);
        assert_eq!(config.payment.merchant_id, "DMT");
        assert_eq!(
            config.identity.claims_exchange_endpoint(),
            "http://localhost:8888/delegate/fetchUserInfo"
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        env::remove_var("APP_HOST");
    }

    #[test]
    fn gate_toggle_accepts_truthy_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("WIZARD_GATE_ON_RECORDS", "true");
        let config = AppConfig::load().expect("config loads");
        assert!(config.wizard.gate_on_records);
        env::remove_var("WIZARD_GATE_ON_RECORDS");
    }

    #[test]
    fn rejects_malformed_claims_request() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IDP_CLAIMS_REQUEST", "{not json");
        let result = AppConfig::load();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidClaimsRequest { .. })
        ));
        env::remove_var("IDP_CLAIMS_REQUEST");
    }
}
