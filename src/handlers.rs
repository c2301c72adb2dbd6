use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use utoipa::openapi::OpenApi;

use crate::context::GatewayContext;
use crate::openapi;
use crate::routes::{AppState, BodyKind, RouteDescriptor, RouteTable};
use crate::validation::{QueryParamDoc, QueryParams, QuerySchema, ValidatedQuery, ValidationErrors};

/// Name used when the caller does not supply one.
pub const DEFAULT_NAME: &str = "Hono";

/// Query accepted by `GET /`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GreetingQuery {
    pub name: Option<String>,
}

impl QuerySchema for GreetingQuery {
    fn parse(params: &QueryParams) -> Result<Self, ValidationErrors> {
        let name = params.optional_string("name")?;
        Ok(Self { name })
    }

    fn describe() -> Vec<QueryParamDoc> {
        vec![QueryParamDoc {
            name: "name",
            required: false,
            description: Some("Who to greet"),
        }]
    }
}

pub fn greeting(name: Option<&str>) -> String {
    format!("Hello {}!", name.unwrap_or(DEFAULT_NAME))
}

/// `GET /` — says hello.
pub async fn greet(ValidatedQuery(query): ValidatedQuery<GreetingQuery>) -> String {
    greeting(query.name.as_deref())
}

/// `GET /openapi` — documents every registered route, advertising a server URL built from the
/// gateway request context.
pub async fn openapi_document(State(state): State<AppState>, context: GatewayContext) -> Json<OpenApi> {
    let base_url = openapi::server_base_url(context.request_context());
    tracing::debug!(
        %base_url,
        request_id = context.request_context().request_id.as_deref(),
        "generating openapi document"
    );
    Json(openapi::generate(&state.routes, &state.api_info, &base_url))
}

/// `GET /ui` — interactive documentation viewer.
pub async fn swagger_ui(State(state): State<AppState>) -> Html<String> {
    state.swagger_ui.render()
}

/// The application's routes, in match order.
pub fn route_table() -> RouteTable {
    RouteTable::new(vec![
        RouteDescriptor::get("/", greet)
            .description("Say hello to the user")
            .query::<GreetingQuery>()
            .response(StatusCode::OK, "Successful response", BodyKind::Text)
            .response(StatusCode::BAD_REQUEST, "Invalid query parameters", BodyKind::Json),
        RouteDescriptor::get("/openapi", openapi_document)
            .description("OpenAPI description of this API")
            .response(StatusCode::OK, "OpenAPI document", BodyKind::Json),
        RouteDescriptor::get("/ui", swagger_ui)
            .description("Swagger UI for this API")
            .response(StatusCode::OK, "Documentation viewer", BodyKind::Html),
    ])
}
