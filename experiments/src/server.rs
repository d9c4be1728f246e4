use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::api::errors::ExperimentError;
use crate::config::Config;
use crate::grouping::registry::GroupingRules;
use crate::router;

/// Serves until `shutdown` resolves. Fails before binding any route when the grouping
/// rules can't be built from `config`.
pub async fn serve<F>(
    config: Config,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), ExperimentError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let rules = match GroupingRules::from_config(&config) {
        Ok(rules) => Arc::new(rules),
        Err(e) => {
            tracing::error!("Failed to build grouping rules: {}", e);
            return Err(e);
        }
    };

    let app = router::router(rules, &config);

    match listener.local_addr() {
        Ok(addr) => tracing::info!("listening on {:?}", addr),
        Err(e) => tracing::warn!("listening on unknown address: {}", e),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ExperimentError::ServerFailed)
}
