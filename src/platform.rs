use std::env;

const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";
const FUNCTION_NAME_ENV: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// Describes where the function binary is executing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RuntimePlatform {
    Lambda(LambdaPlatform),
    #[default]
    Local,
}

impl RuntimePlatform {
    /// Infers the platform from the variables the Lambda runtime (or SAM local) injects.
    pub fn detect() -> Self {
        match LambdaPlatform::from_env() {
            Some(platform) => Self::Lambda(platform),
            None => Self::Local,
        }
    }

    /// Returns the Lambda details when active.
    pub fn as_lambda(&self) -> Option<&LambdaPlatform> {
        match self {
            RuntimePlatform::Lambda(platform) => Some(platform),
            RuntimePlatform::Local => None,
        }
    }

    /// Indicates whether requests arrive through the Lambda runtime API.
    pub fn is_lambda(&self) -> bool {
        matches!(self, RuntimePlatform::Lambda(_))
    }
}

/// Lambda function metadata gleaned from the execution environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LambdaPlatform {
    pub function_name: Option<String>,
    pub function_version: Option<String>,
    pub region: Option<String>,
    pub memory_mb: Option<u32>,
    /// Set when the function runs inside `sam local`.
    pub sam_local: bool,
}

impl LambdaPlatform {
    fn from_env() -> Option<Self> {
        let function_name = env::var(FUNCTION_NAME_ENV).ok();
        let has_lambda_env = function_name.is_some() || env::var(RUNTIME_API_ENV).is_ok();
        if !has_lambda_env {
            return None;
        }

        let function_version = env::var("AWS_LAMBDA_FUNCTION_VERSION").ok();
        let region = env::var("AWS_REGION")
            .ok()
            .or_else(|| env::var("AWS_DEFAULT_REGION").ok());
        let memory_mb = env::var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")
            .ok()
            .and_then(|value| value.parse::<u32>().ok());
        let sam_local = env::var("AWS_SAM_LOCAL")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Some(Self {
            function_name,
            function_version,
            region,
            memory_mb,
            sam_local,
        })
    }
}
