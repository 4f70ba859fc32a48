use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use licence_portal::identity::ClaimsExchanger;
use licence_portal::payment::PaymentGateway;
use licence_portal::wizard::{
    application_router, LicenceApplicationService, RecordsClient, SessionRepository,
};

pub(crate) fn with_application_routes<R, C, X, G>(
    service: Arc<LicenceApplicationService<R, C, X, G>>,
) -> axum::Router
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    application_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemorySessionRepository, StubClaimsExchanger, StubRecordsClient};
    use axum::body::Body;
    use axum::http::Request;
    use licence_portal::config::{AppConfig, WizardPolicy};
    use licence_portal::payment::MockPaymentGateway;
    use tower::util::ServiceExt;

    fn demo_service() -> Arc<
        LicenceApplicationService<
            InMemorySessionRepository,
            StubRecordsClient,
            StubClaimsExchanger,
            MockPaymentGateway,
        >,
    > {
        let config = AppConfig::load().expect("defaults load");
        Arc::new(LicenceApplicationService::new(
            Arc::new(InMemorySessionRepository::default()),
            Arc::new(StubRecordsClient),
            Arc::new(StubClaimsExchanger),
            Arc::new(MockPaymentGateway::always_approving()),
            config.identity,
            WizardPolicy::default(),
            config.payment,
        ))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn mock_login_route_is_wired() {
        let router = with_application_routes(demo_service());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/identity/mock-login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"nic":"199925801234"}"#))
            .expect("request builds");

        let response = router.oneshot(request).await.expect("request routed");
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
