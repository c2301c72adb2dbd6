//! Sandbox API function crate.
//!
//! An axum application meant to run behind API Gateway on AWS Lambda: a greeting endpoint, an
//! OpenAPI document generated from the route table, and a Swagger UI page. The same router runs as
//! a plain local server when no Lambda runtime is detected.

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod platform;
pub mod pretty;
pub mod routes;
pub mod runtime;
pub mod swagger;
pub mod validation;

pub use crate::app::{app, app_with_config};
pub use crate::config::{ConfigError, RuntimeConfig, RuntimeConfigBuilder};
pub use crate::context::{GatewayContext, RequestContext};
pub use crate::error::{DocsError, Result, SandboxError};
pub use crate::openapi::{ApiInfo, server_base_url};
pub use crate::platform::{LambdaPlatform, RuntimePlatform};
pub use crate::routes::{AppState, RouteDescriptor, RouteTable};
pub use crate::runtime::{SandboxRuntime, run, serve};
pub use crate::swagger::SwaggerUi;
pub use crate::validation::{QuerySchema, ValidatedQuery, ValidationErrors};
