use serde::Serialize;
use serde_json::Value;

use crate::config::IdentityConfig;

/// Init payload for the provider's hosted sign-in button.
///
/// The host page loads the provider script and feeds it this object; the
/// service never depends on the script-loading mechanism itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignInWidgetPayload {
    pub authorize_uri: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub scope: String,
    pub nonce: String,
    pub state: String,
    pub acr_values: String,
    pub claims_locales: String,
    pub display: String,
    pub prompt: String,
    pub max_age: u32,
    pub ui_locales: String,
    pub claims: Value,
}

impl SignInWidgetPayload {
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self {
            authorize_uri: config.authorize_uri(),
            redirect_uri: config.redirect_uri.clone(),
            client_id: config.client_id.clone(),
            scope: config.scope.clone(),
            nonce: config.nonce.clone(),
            state: config.state.clone(),
            acr_values: config.acr_values.clone(),
            claims_locales: config.claims_locales.clone(),
            display: config.display.clone(),
            prompt: config.prompt.clone(),
            max_age: config.max_age,
            ui_locales: config.ui_locales.clone(),
            claims: config.claims_request.clone(),
        }
    }
}
