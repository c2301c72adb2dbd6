use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::uri::PathAndQuery;
use axum::http::{Request, Uri};
use lambda_http::request::RequestContext as LambdaRequestContext;
use serde::{Deserialize, Serialize};

/// Header carrying a JSON [`RequestContext`] when no Lambda event is available (local shims, tests).
pub const CONTEXT_HEADER: &str = "x-sandbox-request-context";

/// When set, lambda_http leaves the stage out of request paths.
pub const IGNORE_STAGE_IN_PATH_ENV: &str = "AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH";

/// HTTP API stage that is never part of the path.
const DEFAULT_STAGE: &str = "$default";

/// Request-scoped view of the API Gateway request context.
#[derive(Clone, Debug, Default)]
pub struct GatewayContext {
    request_context: RequestContext,
}

impl GatewayContext {
    pub fn new(request_context: RequestContext) -> Self {
        Self { request_context }
    }

    /// Returns the gateway fields the function cares about.
    pub fn request_context(&self) -> &RequestContext {
        &self.request_context
    }
}

/// The subset of the gateway request context used to build externally reachable URLs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestContext {
    pub domain_name: Option<String>,
    pub stage: Option<String>,
    pub request_id: Option<String>,
    pub api_id: Option<String>,
}

impl RequestContext {
    /// Builds the context from the Lambda event, then the shim header, then nothing.
    fn from_parts(parts: &Parts) -> Self {
        if let Some(context) = parts.extensions.get::<LambdaRequestContext>() {
            return Self::from(context);
        }

        if let Some(context) = Self::from_context_header(parts) {
            return context;
        }

        tracing::debug!("no gateway request context on request");
        Self::default()
    }

    fn from_context_header(parts: &Parts) -> Option<Self> {
        let header = parts.headers.get(CONTEXT_HEADER)?;
        let raw = header.to_str().ok()?;
        match serde_json::from_str(raw) {
            Ok(context) => Some(context),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring malformed request context header");
                None
            }
        }
    }
}

impl From<&LambdaRequestContext> for RequestContext {
    fn from(context: &LambdaRequestContext) -> Self {
        match context {
            LambdaRequestContext::ApiGatewayV1(ctx) => Self {
                domain_name: ctx.domain_name.clone(),
                stage: ctx.stage.clone(),
                request_id: ctx.request_id.clone(),
                api_id: ctx.apiid.clone(),
            },
            LambdaRequestContext::ApiGatewayV2(ctx) => Self {
                domain_name: ctx.domain_name.clone(),
                stage: ctx.stage.clone(),
                request_id: ctx.request_id.clone(),
                api_id: ctx.apiid.clone(),
            },
            _ => Self::default(),
        }
    }
}

/// Removes the `/{stage}` segment lambda_http puts in front of API Gateway event paths, so
/// routes match the same way under any stage. Requests without a Lambda context pass through.
pub fn strip_stage_prefix<B>(mut request: Request<B>) -> Request<B> {
    let stage = request
        .extensions()
        .get::<LambdaRequestContext>()
        .and_then(path_stage);
    let Some(uri) = stage.and_then(|stage| unstaged_uri(request.uri(), stage)) else {
        return request;
    };

    tracing::trace!(path = uri.path(), "stripped stage from request path");
    *request.uri_mut() = uri;
    request
}

fn path_stage(context: &LambdaRequestContext) -> Option<&str> {
    let stage = match context {
        LambdaRequestContext::ApiGatewayV1(ctx) => ctx.stage.as_deref(),
        LambdaRequestContext::ApiGatewayV2(ctx) => ctx.stage.as_deref(),
        _ => None,
    }?;
    (!stage.is_empty() && stage != DEFAULT_STAGE).then_some(stage)
}

fn unstaged_uri(uri: &Uri, stage: &str) -> Option<Uri> {
    let rest = uri.path().strip_prefix('/')?.strip_prefix(stage)?;
    let path = match rest {
        "" => "/",
        rest if rest.starts_with('/') => rest,
        // `/devices` under stage `dev` is a real path.
        _ => return None,
    };
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_owned(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

#[async_trait]
impl<S> FromRequestParts<S> for GatewayContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(RequestContext::from_parts(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use lambda_http::aws_lambda_events::apigw::{
        ApiGatewayProxyRequestContext, ApiGatewayV2httpRequestContext,
    };

    fn staged_request(uri: &str, context: LambdaRequestContext) -> Request<()> {
        Request::builder()
            .uri(uri)
            .extension(context)
            .body(())
            .unwrap()
    }

    fn rest_context(stage: &str) -> LambdaRequestContext {
        let mut ctx = ApiGatewayProxyRequestContext::default();
        ctx.stage = Some(stage.into());
        LambdaRequestContext::ApiGatewayV1(ctx)
    }

    #[test]
    fn strips_rest_stage_and_keeps_query() {
        let request = strip_stage_prefix(staged_request(
            "https://abc123.execute-api.us-east-1.amazonaws.com/dev/?name=Ferris",
            rest_context("dev"),
        ));
        assert_eq!(
            request.uri().to_string(),
            "https://abc123.execute-api.us-east-1.amazonaws.com/?name=Ferris"
        );

        let request = strip_stage_prefix(staged_request("/dev/openapi", rest_context("dev")));
        assert_eq!(request.uri().path(), "/openapi");

        let request = strip_stage_prefix(staged_request("/dev", rest_context("dev")));
        assert_eq!(request.uri().path(), "/");
    }

    #[test]
    fn stage_must_be_a_whole_segment() {
        let request = strip_stage_prefix(staged_request("/devices", rest_context("dev")));
        assert_eq!(request.uri().path(), "/devices");

        let request = strip_stage_prefix(staged_request("/ui", rest_context("dev")));
        assert_eq!(request.uri().path(), "/ui");
    }

    #[test]
    fn default_http_stage_and_plain_requests_pass_through() {
        let mut ctx = ApiGatewayV2httpRequestContext::default();
        ctx.stage = Some("$default".into());
        let request = strip_stage_prefix(staged_request(
            "/$default/ui",
            LambdaRequestContext::ApiGatewayV2(ctx),
        ));
        assert_eq!(request.uri().path(), "/$default/ui");

        let request = Request::builder().uri("/dev/ui").body(()).unwrap();
        assert_eq!(strip_stage_prefix(request).uri().path(), "/dev/ui");
    }

    #[test]
    fn reads_lambda_rest_context_from_extensions() {
        let mut ctx = ApiGatewayProxyRequestContext::default();
        ctx.domain_name = Some("abc123.execute-api.us-east-1.amazonaws.com".into());
        ctx.stage = Some("dev".into());
        ctx.request_id = Some("req-1".into());
        ctx.apiid = Some("abc123".into());

        let request = Request::builder()
            .uri("/openapi")
            .extension(LambdaRequestContext::ApiGatewayV1(ctx))
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();
        let context = RequestContext::from_parts(&parts);

        assert_eq!(
            context.domain_name.as_deref(),
            Some("abc123.execute-api.us-east-1.amazonaws.com")
        );
        assert_eq!(context.stage.as_deref(), Some("dev"));
        assert_eq!(context.request_id.as_deref(), Some("req-1"));
        assert_eq!(context.api_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn lambda_context_wins_over_header() {
        let mut ctx = ApiGatewayProxyRequestContext::default();
        ctx.domain_name = Some("real.example.com".into());
        ctx.stage = Some("dev".into());

        let request = Request::builder()
            .uri("/openapi")
            .header(CONTEXT_HEADER, r#"{"domainName":"spoofed.example.com","stage":"x"}"#)
            .extension(LambdaRequestContext::ApiGatewayV1(ctx))
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        assert_eq!(
            RequestContext::from_parts(&parts).domain_name.as_deref(),
            Some("real.example.com")
        );
    }

    #[test]
    fn header_fills_in_without_lambda() {
        let request = Request::builder()
            .uri("/openapi")
            .header(CONTEXT_HEADER, r#"{"domainName":"localhost:3000","stage":"dev"}"#)
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();
        let context = RequestContext::from_parts(&parts);

        assert_eq!(context.domain_name.as_deref(), Some("localhost:3000"));
        assert_eq!(context.stage.as_deref(), Some("dev"));
        assert!(context.request_id.is_none());
    }

    #[test]
    fn malformed_header_falls_back_to_empty() {
        let request = Request::builder()
            .uri("/openapi")
            .header(CONTEXT_HEADER, "{not json")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        assert_eq!(RequestContext::from_parts(&parts), RequestContext::default());
    }
}
