use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use metrics::counter;
use tracing::instrument;

use crate::{
    api::{
        errors::ExperimentError,
        types::{
            BrokerResponse, ExperimentResponse, ExperimentsRequest, ExperimentsResponse,
            LandingRequest, LandingResponse, RelierResponse, RouteQueryParams,
        },
    },
    contexts::{AuthBrokerKind, RelierKind},
    flows::landing,
    grouping::registry::ExperimentName,
    metrics_consts::{EXPERIMENT_REQUESTS_COUNTER, LANDING_DECISIONS_COUNTER},
    router,
    routes::{self, ResolvedRoute},
};

fn require_json(headers: &HeaderMap) -> Result<(), ExperimentError> {
    match headers
        .get("content-type")
        .map_or("", |v| v.to_str().unwrap_or(""))
    {
        "application/json" => {
            tracing::Span::current().record("content_type", "application/json");
            Ok(())
        }
        ct => Err(ExperimentError::RequestDecodingError(format!(
            "unsupported content type: {}",
            ct
        ))),
    }
}

/// Groups for every known experiment.
#[instrument(skip_all, fields(content_type, forced))]
#[debug_handler]
pub async fn experiments(
    state: State<router::State>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ExperimentsResponse>, ExperimentError> {
    require_json(&headers)?;
    let request = ExperimentsRequest::from_bytes(body)?;
    let forced = request.forced();
    tracing::Span::current().record("forced", forced.is_some());

    counter!(EXPERIMENT_REQUESTS_COUNTER, "experiment" => "all").increment(1);

    Ok(Json(ExperimentsResponse {
        experiments: state.rules.choose_all(&request.subject, forced.as_ref()),
    }))
}

#[instrument(skip_all, fields(experiment, content_type))]
#[debug_handler]
pub async fn experiment(
    state: State<router::State>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ExperimentResponse>, ExperimentError> {
    tracing::Span::current().record("experiment", name.as_str());
    let experiment = ExperimentName::parse(&name)?;
    require_json(&headers)?;
    let request = ExperimentsRequest::from_bytes(body)?;

    counter!(EXPERIMENT_REQUESTS_COUNTER, "experiment" => experiment.to_string()).increment(1);

    let forced = request.forced();
    let group = state
        .rules
        .choose_with_override(experiment, &request.subject, forced.as_ref());
    Ok(Json(ExperimentResponse {
        experiment: experiment.to_string(),
        group,
    }))
}

/// Where `/` sends the visitor.
#[instrument(skip_all, fields(content_type))]
#[debug_handler]
pub async fn landing(
    state: State<router::State>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LandingResponse>, ExperimentError> {
    require_json(&headers)?;
    let request = LandingRequest::from_bytes(body)?;

    let email_first = state.rules.choose_with_override(
        ExperimentName::EmailFirst,
        &request.subject,
        request.forced().as_ref(),
    );
    let decision = landing::decide(&request.context, &email_first);

    let labels = [("email_first_flow", decision.email_first_flow.to_string())];
    counter!(LANDING_DECISIONS_COUNTER, &labels).increment(1);
    tracing::debug!(decision = ?decision, "decided landing page");

    Ok(Json(LandingResponse {
        email_first,
        decision,
    }))
}

pub async fn broker(Path(context): Path<String>) -> Json<BrokerResponse> {
    let broker = AuthBrokerKind::from_context(&context).module_name();
    Json(BrokerResponse { context, broker })
}

pub async fn relier(Path(name): Path<String>) -> Json<RelierResponse> {
    let relier = RelierKind::from_name(&name).module_name();
    Json(RelierResponse { name, relier })
}

#[instrument(skip_all, fields(page))]
pub async fn route(
    Query(params): Query<RouteQueryParams>,
) -> Result<Json<ResolvedRoute>, ExperimentError> {
    let page = routes::current_page(&params.fragment);
    tracing::Span::current().record("page", page);

    routes::resolve(&params.fragment, params.email_first_flow)
        .map(Json)
        .ok_or_else(|| ExperimentError::UnknownRoute(page.to_string()))
}
