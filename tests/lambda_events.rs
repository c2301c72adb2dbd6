//! Drives the router with API Gateway proxy events decoded by lambda_http, the same way the
//! deployed function receives them.

use axum::body::Body;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::{Map, Value, json};
use tower::ServiceExt;

const DOMAIN: &str = "abc123.execute-api.us-east-1.amazonaws.com";

/// REST API (payload v1) event for `GET {path}` on stage `dev`.
fn rest_event(path: &str, query: &[(&str, &str)]) -> Value {
    let mut event = json!({
        "resource": "/{proxy+}",
        "path": path,
        "httpMethod": "GET",
        "headers": { "Host": DOMAIN, "Accept": "*/*" },
        "pathParameters": { "proxy": path.trim_start_matches('/') },
        "requestContext": {
            "accountId": "123456789012",
            "resourceId": "us4z18",
            "stage": "dev",
            "requestId": "41b45ea3-70b5-11e6-b7bd-69b5aaebc7d9",
            "requestTimeEpoch": 1583798639428u64,
            "identity": { "sourceIp": "192.168.100.1", "userAgent": "curl/8.0" },
            "resourcePath": "/{proxy+}",
            "httpMethod": "GET",
            "domainName": DOMAIN,
            "apiId": "abc123"
        },
        "isBase64Encoded": false
    });

    if !query.is_empty() {
        let single: Map<String, Value> = query
            .iter()
            .map(|(key, value)| ((*key).to_owned(), json!(value)))
            .collect();
        let multi: Map<String, Value> = query
            .iter()
            .map(|(key, value)| ((*key).to_owned(), json!([value])))
            .collect();
        event["queryStringParameters"] = Value::Object(single);
        event["multiValueQueryStringParameters"] = Value::Object(multi);
    }
    event
}

/// HTTP API (payload v2) event for `GET {raw_path}` on `stage`.
fn http_event(raw_path: &str, raw_query: &str, stage: &str) -> Value {
    json!({
        "version": "2.0",
        "routeKey": "$default",
        "rawPath": raw_path,
        "rawQueryString": raw_query,
        "headers": { "host": DOMAIN, "accept": "*/*" },
        "requestContext": {
            "accountId": "123456789012",
            "apiId": "abc123",
            "domainName": DOMAIN,
            "domainPrefix": "abc123",
            "http": {
                "method": "GET",
                "path": raw_path,
                "protocol": "HTTP/1.1",
                "sourceIp": "192.168.100.1",
                "userAgent": "curl/8.0"
            },
            "requestId": "id",
            "routeKey": "$default",
            "stage": stage,
            "time": "12/Mar/2020:19:03:58 +0000",
            "timeEpoch": 1583348638390u64
        },
        "isBase64Encoded": false
    })
}

async fn invoke(event: Value) -> (StatusCode, String) {
    let request = lambda_http::request::from_str(&event.to_string()).expect("event");
    let request = request.map(|body| Body::from(body.to_vec()));

    let response = sandbox_api::app()
        .expect("app")
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn rest_event_greets_under_stage() {
    let (status, body) = invoke(rest_event("/", &[("name", "Ferris")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello Ferris!");

    let (status, body) = invoke(rest_event("/", &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello Hono!");
}

#[tokio::test]
async fn rest_event_document_uses_event_context() {
    let (status, body) = invoke(rest_event("/openapi", &[])).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        doc["servers"][0]["url"],
        "https://abc123.execute-api.us-east-1.amazonaws.com/dev"
    );
}

#[tokio::test]
async fn rest_event_serves_ui_and_unknown_paths() {
    let (status, body) = invoke(rest_event("/ui", &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"url: "./openapi""#), "{body}");

    let (status, _) = invoke(rest_event("/missing", &[])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_event_with_stage_in_raw_path() {
    let (status, body) = invoke(http_event("/dev/", "name=Ferris", "dev")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello Ferris!");

    let (status, body) = invoke(http_event("/dev/openapi", "", "dev")).await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        doc["servers"][0]["url"],
        "https://abc123.execute-api.us-east-1.amazonaws.com/dev"
    );
}

#[tokio::test]
async fn http_event_on_default_stage() {
    let (status, body) = invoke(http_event("/", "name=Ferris", "$default")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello Ferris!");
}
