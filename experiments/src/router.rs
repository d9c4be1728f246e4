use std::{future::ready, sync::Arc};

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api::endpoint,
    config::Config,
    grouping::registry::GroupingRules,
    metrics_utils::{setup_metrics_recorder, track_metrics},
};

#[derive(Clone)]
pub struct State {
    pub rules: Arc<GroupingRules>,
}

pub fn router(rules: Arc<GroupingRules>, config: &Config) -> Router {
    let state = State { rules };

    // The portal is served from other origins than this service.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .allow_origin(AllowOrigin::mirror_request());

    // liveness/readiness checks
    let status_router = Router::new()
        .route("/", get(index))
        .route("/_readiness", get(index))
        .route("/_liveness", get(|| ready("ok")));

    let experiments_router = Router::new()
        .route("/experiments", post(endpoint::experiments))
        .route("/experiments/:name", post(endpoint::experiment))
        .route("/landing", post(endpoint::landing))
        .route("/contexts/broker/:context", get(endpoint::broker))
        .route("/contexts/relier/:name", get(endpoint::relier))
        .route("/routes", get(endpoint::route))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrency));

    let router = Router::new()
        .merge(status_router)
        .merge(experiments_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state);

    // Don't install metrics unless asked to
    // Global metrics recorders can play poorly with e.g. tests
    if config.enable_metrics {
        let recorder_handle = setup_metrics_recorder();
        router.route("/metrics", get(move || ready(recorder_handle.render())))
    } else {
        router
    }
}

pub async fn index() -> &'static str {
    "experiments"
}
