use axum::body::{self, Body};
use axum::extract::Request;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const PRETTY_KEY: &str = "pretty";

/// Re-indents JSON responses when the request carries a `pretty` query key.
pub async fn pretty_json(request: Request, next: Next) -> Response {
    let wants_pretty = request.uri().query().is_some_and(has_pretty_key);
    let response = next.run(request).await;

    if wants_pretty && is_json(&response) {
        reformat(response).await
    } else {
        response
    }
}

fn has_pretty_key(query: &str) -> bool {
    query
        .split('&')
        .any(|pair| pair.split('=').next() == Some(PRETTY_KEY))
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

async fn reformat(response: Response) -> Response {
    let (mut parts, body) = response.into_parts();
    let bytes = match body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to buffer json response");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    let pretty = serde_json::from_slice::<serde_json::Value>(&bytes)
        .and_then(|value| serde_json::to_vec_pretty(&value));
    match pretty {
        Ok(pretty) => {
            parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(pretty.len()));
            Response::from_parts(parts, Body::from(pretty))
        }
        // Not actually JSON; pass it through untouched.
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}
