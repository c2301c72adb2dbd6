use std::slice;
use std::sync::Arc;

use axum::Router;
use axum::handler::Handler;
use axum::http::StatusCode;
use axum::routing::{self, MethodRouter};

use crate::openapi::ApiInfo;
use crate::swagger::SwaggerUi;
use crate::validation::{QueryParamDoc, QuerySchema};

/// State shared by every handler: the route table itself plus the docs configuration.
#[derive(Clone, Debug)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub api_info: Arc<ApiInfo>,
    pub swagger_ui: Arc<SwaggerUi>,
}

/// Kind of body a documented response carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Text,
    Json,
    Html,
}

impl BodyKind {
    pub fn content_type(self) -> &'static str {
        match self {
            BodyKind::Text => "text/plain",
            BodyKind::Json => "application/json",
            BodyKind::Html => "text/html",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseDoc {
    pub status: StatusCode,
    pub description: &'static str,
    pub body: Option<BodyKind>,
}

/// Path, documentation, and handler for one `GET` route.
#[derive(Debug)]
pub struct RouteDescriptor {
    path: &'static str,
    description: Option<&'static str>,
    query_params: Vec<QueryParamDoc>,
    responses: Vec<ResponseDoc>,
    handler: MethodRouter<AppState>,
}

impl RouteDescriptor {
    /// Declares a `GET` route at `path`.
    pub fn get<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            path,
            description: None,
            query_params: Vec::new(),
            responses: Vec::new(),
            handler: routing::get(handler),
        }
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Documents the query parameters accepted by schema `Q`.
    pub fn query<Q: QuerySchema>(mut self) -> Self {
        self.query_params = Q::describe();
        self
    }

    pub fn response(mut self, status: StatusCode, description: &'static str, body: BodyKind) -> Self {
        self.responses.push(ResponseDoc {
            status,
            description,
            body: Some(body),
        });
        self
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn description_text(&self) -> Option<&'static str> {
        self.description
    }

    pub fn query_params(&self) -> &[QueryParamDoc] {
        &self.query_params
    }

    pub fn responses(&self) -> &[ResponseDoc] {
        &self.responses
    }
}

/// Immutable, ordered list of routes. Built once and shared by the router and the doc generator.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    pub fn iter(&self) -> slice::Iter<'_, RouteDescriptor> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Builds the axum router serving every route in the table.
    pub fn router(self: Arc<Self>, api_info: ApiInfo, swagger_ui: SwaggerUi) -> Router {
        let state = AppState {
            routes: Arc::clone(&self),
            api_info: Arc::new(api_info),
            swagger_ui: Arc::new(swagger_ui),
        };

        self.routes
            .iter()
            .fold(Router::new(), |router, route| {
                router.route(route.path, route.handler.clone())
            })
            .with_state(state)
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteDescriptor;
    type IntoIter = slice::Iter<'a, RouteDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
