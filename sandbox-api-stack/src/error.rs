use thiserror::Error;

/// Errors raised while declaring or synthesizing the stack.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("invalid logical id {0:?}: must be 1-255 ascii alphanumerics")]
    InvalidLogicalId(String),
    #[error("logical id {0:?} is already in use")]
    DuplicateLogicalId(String),
    #[error("invalid stage name {0:?}: only alphanumerics, hyphens and underscores are allowed")]
    InvalidStageName(String),
    #[error("failed to serialize template: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
