//! OpenAPI document generation from the route table.

use std::collections::BTreeMap;

use utoipa::openapi::path::{
    OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder, PathItemType,
};
use utoipa::openapi::schema::{ObjectBuilder, Schema, SchemaType};
use utoipa::openapi::{
    ContentBuilder, InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, Required, ResponseBuilder,
    Server,
};

use crate::context::RequestContext;
use crate::routes::{BodyKind, RouteDescriptor, RouteTable};

/// Server URL advertised when the request context cannot say where the API lives.
pub const RELATIVE_BASE_URL: &str = ".";

const LOCAL_HOST_PREFIXES: [&str; 2] = ["127.0.0.1", "localhost"];

/// Info block of the generated document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            title: "Sandbox API".to_owned(),
            version: "0.1.0".to_owned(),
            description: "Sandbox API".to_owned(),
        }
    }
}

/// Computes the server URL callers can actually reach for this request.
///
/// The gateway serves non-local deployments under `/{stage}`, so the stage is part of the base URL.
/// SAM local does not add the stage segment, so loopback hosts get plain `http://{domain}`.
pub fn server_base_url(context: &RequestContext) -> String {
    let (Some(domain_name), Some(stage)) = (&context.domain_name, &context.stage) else {
        return RELATIVE_BASE_URL.to_owned();
    };

    let is_local = LOCAL_HOST_PREFIXES
        .iter()
        .any(|prefix| domain_name.starts_with(prefix));
    if is_local {
        format!("http://{domain_name}")
    } else {
        format!("https://{domain_name}/{stage}")
    }
}

/// Builds the OpenAPI document for every route in `routes`.
pub fn generate(routes: &RouteTable, info: &ApiInfo, base_url: &str) -> OpenApi {
    let mut by_path: BTreeMap<&str, PathItemBuilder> = BTreeMap::new();
    for route in routes.iter() {
        let item = by_path.remove(route.path()).unwrap_or_default();
        by_path.insert(
            route.path(),
            item.operation(PathItemType::Get, operation(route)),
        );
    }

    let paths = by_path
        .into_iter()
        .fold(PathsBuilder::new(), |paths, (path, item)| {
            paths.path(path, item.build())
        });

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(info.title.as_str())
                .version(info.version.as_str())
                .description(Some(info.description.as_str()))
                .build(),
        )
        .servers(Some([Server::new(base_url)]))
        .paths(paths)
        .build()
}

fn operation(route: &RouteDescriptor) -> utoipa::openapi::path::Operation {
    let mut builder = OperationBuilder::new().description(route.description_text());

    for param in route.query_params() {
        builder = builder.parameter(
            ParameterBuilder::new()
                .name(param.name)
                .parameter_in(ParameterIn::Query)
                .required(if param.required {
                    Required::True
                } else {
                    Required::False
                })
                .description(param.description)
                .schema(Some(string_schema())),
        );
    }

    for response in route.responses() {
        let mut doc = ResponseBuilder::new().description(response.description);
        if let Some(body) = response.body {
            doc = doc.content(
                body.content_type(),
                ContentBuilder::new().schema(body_schema(body)).build(),
            );
        }
        builder = builder.response(response.status.as_str(), doc.build());
    }

    builder.build()
}

fn string_schema() -> Schema {
    Schema::Object(ObjectBuilder::new().schema_type(SchemaType::String).build())
}

fn body_schema(body: BodyKind) -> Schema {
    match body {
        BodyKind::Text | BodyKind::Html => string_schema(),
        BodyKind::Json => Schema::Object(ObjectBuilder::new().schema_type(SchemaType::Object).build()),
    }
}
