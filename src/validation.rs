//! Query-string schemas and the extractor that runs them before a handler.
//!
//! A schema is a pure function from decoded [`QueryParams`] to either the typed value or a list of
//! [`ValidationIssue`]s. [`ValidatedQuery`] composes that function in front of the handler, so a
//! handler never sees input its schema rejected.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Decoded query string, keeping every value of a repeated key in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Decodes an `application/x-www-form-urlencoded` query string.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationErrors> {
        let raw = raw.unwrap_or_default();
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).map_err(|err| {
            ValidationErrors::single(ValidationIssue::new("", format!("malformed query string: {err}")))
        })?;

        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            values.entry(key).or_default().push(value);
        }
        Ok(Self { values })
    }

    /// All values supplied for `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Reads `key` as an optional string: absent is `None`, repeated is an array and fails.
    pub fn optional_string(&self, key: &str) -> Result<Option<String>, ValidationIssue> {
        match self.get_all(key) {
            [] => Ok(None),
            [value] => Ok(Some(value.clone())),
            values => Err(ValidationIssue::new(
                key,
                format!("expected string, received array of {}", values.len()),
            )),
        }
    }
}

/// Documentation for one query parameter, fed into the generated OpenAPI document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryParamDoc {
    pub name: &'static str,
    pub required: bool,
    pub description: Option<&'static str>,
}

/// A typed query-string schema.
pub trait QuerySchema: Sized + Send {
    /// Validates decoded parameters. Unknown keys are ignored.
    fn parse(params: &QueryParams) -> Result<Self, ValidationErrors>;

    /// Describes the accepted parameters for documentation.
    fn describe() -> Vec<QueryParamDoc>;
}

/// Runs schema `T` against a raw query string.
pub fn validate_query<T: QuerySchema>(raw: Option<&str>) -> Result<T, ValidationErrors> {
    let params = QueryParams::parse(raw)?;
    T::parse(&params)
}

/// One schema violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Rejection produced when a query string does not satisfy its schema.
///
/// Renders as `400 Bad Request` with `{"success": false, "error": [{"path", "message"}, ...]}`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("query validation failed with {} issue(s)", .issues.len())]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn single(issue: ValidationIssue) -> Self {
        Self::new(vec![issue])
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

impl From<ValidationIssue> for ValidationErrors {
    fn from(issue: ValidationIssue) -> Self {
        Self::single(issue)
    }
}

#[derive(Serialize)]
struct ValidationErrorBody<'a> {
    success: bool,
    error: &'a [ValidationIssue],
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        tracing::debug!(issues = ?self.issues, "rejecting query");
        let body = ValidationErrorBody {
            success: false,
            error: &self.issues,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Extractor yielding a query string that passed schema `T`.
#[derive(Clone, Debug)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: QuerySchema,
    S: Send + Sync,
{
    type Rejection = ValidationErrors;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        validate_query(parts.uri.query()).map(ValidatedQuery)
    }
}
