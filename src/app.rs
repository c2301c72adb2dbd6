use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, Method};
use axum::body::Body;
use axum::middleware;
use tower_http::cors::{Any, CorsLayer};
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use crate::config::RuntimeConfig;
use crate::context::strip_stage_prefix;
use crate::error::Result;
use crate::handlers;
use crate::openapi::ApiInfo;
use crate::pretty::pretty_json;
use crate::swagger::SwaggerUi;

/// Where the UI page loads the document from, relative to `/ui`.
pub const SPEC_URL: &str = "./openapi";

/// Builds the application router with default docs settings.
pub fn app() -> Result<Router> {
    app_with_config(&RuntimeConfig::default())
}

/// Builds the application router for `config`.
pub fn app_with_config(config: &RuntimeConfig) -> Result<Router> {
    let router = build(config.api_info.clone())?;
    if !config.strip_stage_prefix {
        return Ok(router);
    }

    // Routing happens before `Router::layer` middleware runs, so the rewrite wraps the
    // whole router instead.
    Ok(Router::new().fallback_service(router.map_request(strip_stage_prefix::<Body>)))
}

fn build(api_info: ApiInfo) -> Result<Router> {
    let routes = Arc::new(handlers::route_table());
    let swagger_ui = SwaggerUi::new(SPEC_URL)?;

    Ok(routes
        .router(api_info, swagger_ui)
        .layer(middleware::from_fn(pretty_json))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http()))
}

/// Mirrors the gateway's preflight policy on actual responses.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::OPTIONS,
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::PATCH,
            Method::HEAD,
        ])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("x-amz-date"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-amz-security-token"),
            HeaderName::from_static("x-amz-user-agent"),
        ])
}
