use crate::api::api_error::APIError;
use crate::api::model::{ExploreQuery, USAGE};
use crate::api::server::AppState;
use crate::mapping::AwsMapping;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/", get(usage))
        .route("/healthcheck", get(health_check))
        .route("/explore", get(explore))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn usage() -> &'static str {
    USAGE
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn explore(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ExploreQuery>, APIError>,
) -> Result<Json<AwsMapping>, APIError> {
    let mapping = state.explorer.explore(query.request_url.as_deref()).await?;
    tracing::info!(
        "explored {} ({} origins)",
        mapping.target_domain.domain_name,
        mapping.cloud_front_origins.len()
    );
    Ok(Json(mapping))
}
