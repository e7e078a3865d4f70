//! Route table of the service, in matching order.

use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, CorsPolicy, Dispatcher, RouteContext, RouteError, RouteTable};
use core_config::AppInfo;
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub meta: AppInfo,
}

pub fn route_table() -> Result<RouteTable<AppState>, RouteError> {
    let builder = RouteTable::builder()
        .options("*", preflight)
        .get("/api", info)
        .get("/healthz", healthz)
        .get("/metrics", metrics);

    domain_events::register(builder).get("*", assets).build()
}

/// Dispatcher over [`route_table`], mounted as an axum router.
pub fn router(state: AppState, cors: CorsPolicy) -> Result<axum::Router, RouteError> {
    let table = route_table()?;
    Ok(Dispatcher::new(table, state)
        .with_cors(cors)
        .into_axum_router())
}

/// CORS headers are added by the dispatcher; the body stays empty.
async fn preflight(ctx: RouteContext<AppState>) -> Result<StatusCode, AppError> {
    debug!(
        path = ctx.request.uri().path(),
        headers = ?ctx.headers(),
        "Preflight request"
    );
    Ok(StatusCode::OK)
}

async fn info(ctx: RouteContext<AppState>) -> Result<Json<ServiceInfo>, AppError> {
    Ok(Json(ServiceInfo {
        message: "ok",
        meta: ctx.state.app.as_ref().clone(),
    }))
}

async fn healthz(ctx: RouteContext<AppState>) -> Result<Response, AppError> {
    Ok(ctx.state.terminator.health_response())
}

async fn metrics(_ctx: RouteContext<AppState>) -> Result<Response, AppError> {
    Ok(observability::metrics_handler().await.into_response())
}

async fn assets(ctx: RouteContext<AppState>) -> Result<Response, AppError> {
    let path = ctx.request.uri().path().to_string();
    let service = ServeDir::new(ctx.state.public_dir.as_path());

    let response = service
        .oneshot(ctx.into_request())
        .await
        .unwrap_or_else(|never| match never {});

    if response.status() == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(format!("No asset at {}", path)));
    }
    Ok(response.map(Body::new))
}
