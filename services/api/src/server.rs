use crate::cli::ServeArgs;
use crate::infra::{default_scoring_config, demo_fixture, AppState};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobmatch::config::AppConfig;
use jobmatch::error::AppError;
use jobmatch::telemetry;
use jobmatch::workflows::matching::MatchingService;
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

    // Stores are in-memory stand-ins seeded with fixture data; production
    // deployments wire the catalog, directory, shortlist, and application
    // collaborators plus the identity provider here instead.
    let fixture = demo_fixture();
    let service = Arc::new(MatchingService::new(
        fixture.catalog,
        fixture.directory,
        fixture.shortlists,
        fixture.applications,
        default_scoring_config(),
    ));

    let app = with_matching_routes(service, fixture.verifier)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job matching service ready");
    for (token, owner) in &fixture.tokens {
        info!(%token, %owner, "fixture bearer token available");
    }

    axum::serve(listener, app).await?;
    Ok(())
}
