use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, SandboxError>;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Docs(#[from] DocsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("lambda runtime error: {0}")]
    Lambda(lambda_http::Error),
}

/// Errors raised while assembling the documentation endpoints.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("swagger ui spec url must be a relative path reference, got {0:?}")]
    NonRelativeSpecUrl(String),
}
