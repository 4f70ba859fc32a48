use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, FieldValue};
use super::records::{RecordSlice, RecordsClient};
use super::service::{LicenceApplicationService, PaymentParams, ServiceError};
use super::session::{SessionError, SessionRepository};
use crate::identity::{CallbackParams, ClaimsExchanger, SignInWidgetPayload};
use crate::payment::{PaymentError, PaymentGateway, PaymentInstrument};
use crate::wizard::controller::WizardError;

/// Router builder exposing the application wizard over HTTP.
pub fn application_router<R, C, X, G>(
    service: Arc<LicenceApplicationService<R, C, X, G>>,
) -> Router
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    Router::new()
        .route(
            "/api/v1/identity/signin-config",
            get(signin_config_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/identity/callback",
            get(callback_query_handler::<R, C, X, G>).post(callback_json_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/identity/mock-login",
            post(mock_login_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/licence-categories",
            get(categories_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(session_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id/next",
            post(next_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id/back",
            post(back_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id/fields",
            post(field_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id/records/:slice",
            post(record_fetch_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id/categories",
            post(category_toggle_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id/submit",
            post(submit_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id/payment",
            post(payment_handler::<R, C, X, G>),
        )
        .route(
            "/api/v1/applications/:application_id/reset",
            post(reset_handler::<R, C, X, G>),
        )
        .with_state(service)
}

type Service<R, C, X, G> = Arc<LicenceApplicationService<R, C, X, G>>;

#[derive(Debug, Deserialize)]
pub(crate) struct MockLoginRequest {
    pub(crate) nic: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldUpdateRequest {
    pub(crate) key: String,
    pub(crate) value: FieldValue,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryToggleRequest {
    pub(crate) id: String,
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Handoff { .. } => StatusCode::UNAUTHORIZED,
        ServiceError::Session(SessionError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Session(SessionError::Conflict) | ServiceError::WrongPhase { .. } => {
            StatusCode::CONFLICT
        }
        ServiceError::Wizard(WizardError::NotAtFinalStep { .. }) => StatusCode::CONFLICT,
        ServiceError::Wizard(WizardError::RecordsOutstanding) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Payment(PaymentError::InvalidCard(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Records(_) | ServiceError::Payment(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Session(SessionError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = match &err {
        ServiceError::Handoff { code, message } => json!({
            "error_code": code,
            "error_description": message,
        }),
        other => json!({ "error": other.to_string() }),
    };

    (status, axum::Json(body)).into_response()
}

async fn signin_config_handler<R, C, X, G>(State(service): State<Service<R, C, X, G>>) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let payload = SignInWidgetPayload::from_config(service.identity_config());
    (StatusCode::OK, axum::Json(payload)).into_response()
}

async fn callback_query_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    RawQuery(query): RawQuery,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let params = CallbackParams::from_query(query.as_deref().unwrap_or(""));
    begin_response(&service, &params).await
}

async fn callback_json_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    axum::Json(params): axum::Json<CallbackParams>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    begin_response(&service, &params).await
}

async fn begin_response<R, C, X, G>(
    service: &LicenceApplicationService<R, C, X, G>,
    params: &CallbackParams,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    match service.begin_with_callback(params).await {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn mock_login_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    axum::Json(request): axum::Json<MockLoginRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    match service.begin_with_nic(&request.nic) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn categories_handler<R, C, X, G>(State(service): State<Service<R, C, X, G>>) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    match service.licence_categories().await {
        Ok(catalogue) => (StatusCode::OK, axum::Json(catalogue)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn session_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn next_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.next(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn back_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.back(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn field_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<FieldUpdateRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.update_field(&id, &request.key, request.value) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn record_fetch_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path((application_id, slice)): Path<(String, String)>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    let slice = match RecordSlice::parse(&slice) {
        Some(slice) => slice,
        None => {
            let body = json!({ "error": format!("unknown record slice '{slice}'") });
            return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
        }
    };

    match service.fetch_slice(&id, slice).await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn category_toggle_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<CategoryToggleRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.toggle_category(&id, &request.id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn submit_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.submit(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn payment_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path(application_id): Path<String>,
    Query(params): Query<PaymentParams>,
    axum::Json(instrument): axum::Json<PaymentInstrument>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.pay(&id, params, instrument).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn reset_handler<R, C, X, G>(
    State(service): State<Service<R, C, X, G>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.reset(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}
