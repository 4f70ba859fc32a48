use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionRepository};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use licence_portal::config::AppConfig;
use licence_portal::error::AppError;
use licence_portal::identity::HttpClaimsExchanger;
use licence_portal::payment::MockPaymentGateway;
use licence_portal::telemetry;
use licence_portal::wizard::{HttpRecordsClient, LicenceApplicationService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sessions = Arc::new(InMemorySessionRepository::default());
    let records = Arc::new(HttpRecordsClient::new(&config.upstream));
    let exchanger = Arc::new(HttpClaimsExchanger::new(&config.identity));
    let gateway = Arc::new(MockPaymentGateway::default());
    let application_service = Arc::new(LicenceApplicationService::new(
        sessions,
        records,
        exchanger,
        gateway,
        config.identity.clone(),
        config.wizard,
        config.payment.clone(),
    ));

    let app = with_application_routes(application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "licence application portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
