use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryConvenioRepository};
use crate::routes::with_domain_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use clinica::availability::{AvailabilityService, HttpAvailabilitySource};
use clinica::config::AppConfig;
use clinica::convenios::ConvenioService;
use clinica::error::AppError;
use clinica::session::JsonFileSessionStore;
use clinica::telemetry;
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let convenio_service = Arc::new(ConvenioService::new(Arc::new(
        InMemoryConvenioRepository::default(),
    )));

    let session_store = Arc::new(JsonFileSessionStore::new(config.session.file.clone()));
    let source = HttpAvailabilitySource::new(&config.upstream)?.with_session(session_store);
    let availability_service = Arc::new(AvailabilityService::new(Arc::new(source)));

    let app = with_domain_routes(convenio_service, availability_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        upstream = %config.upstream.base_url,
        "clinica service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
