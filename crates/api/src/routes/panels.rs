//! Analytics panel endpoints.
//!
//! Each handler takes the panel configuration as JSON and runs it against
//! the event store through [`AnalyticsService`](analytics::AnalyticsService).
//! A body that does not fit the panel's shape is a `VALID_001` error.

use analytics::{
    BarEntry, BarQuery, FunnelQuery, FunnelStep, MetricQuery, MetricResult, TrendQuery,
    TrendSeries,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use event_store::Overview;
use serde::Deserialize;
use tracking_core::SessionAggregate;

use crate::response::ApiError;
use crate::state::AppState;

/// POST /api/analytics/metric
pub async fn metric_handler(
    State(state): State<AppState>,
    query: Result<Json<MetricQuery>, JsonRejection>,
) -> Result<Json<MetricResult>, ApiError> {
    let Json(query) = query?;
    Ok(Json(state.analytics.metric(&query).await?))
}

/// POST /api/analytics/bar
pub async fn bar_handler(
    State(state): State<AppState>,
    query: Result<Json<BarQuery>, JsonRejection>,
) -> Result<Json<Vec<BarEntry>>, ApiError> {
    let Json(query) = query?;
    Ok(Json(state.analytics.bar(&query).await?))
}

/// POST /api/analytics/trend
pub async fn trend_handler(
    State(state): State<AppState>,
    query: Result<Json<TrendQuery>, JsonRejection>,
) -> Result<Json<Vec<TrendSeries>>, ApiError> {
    let Json(query) = query?;
    Ok(Json(state.analytics.trend(&query).await?))
}

/// POST /api/analytics/funnel
pub async fn funnel_handler(
    State(state): State<AppState>,
    query: Result<Json<FunnelQuery>, JsonRejection>,
) -> Result<Json<Vec<FunnelStep>>, ApiError> {
    let Json(query) = query?;
    Ok(Json(state.analytics.funnel(&query).await?))
}

/// GET /api/analytics/overview
pub async fn overview_handler(State(state): State<AppState>) -> Result<Json<Overview>, ApiError> {
    Ok(Json(state.analytics.overview().await?))
}

#[derive(Debug, Deserialize)]
pub struct SessionsParams {
    pub limit: Option<usize>,
}

/// GET /api/analytics/sessions?limit=N - Most recently active first.
pub async fn sessions_handler(
    State(state): State<AppState>,
    Query(params): Query<SessionsParams>,
) -> Result<Json<Vec<SessionAggregate>>, ApiError> {
    Ok(Json(state.store.sessions(params.limit).await?))
}
