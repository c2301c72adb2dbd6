use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use dotenvy::Error as DotenvError;
use thiserror::Error;

use crate::context::IGNORE_STAGE_IN_PATH_ENV;
use crate::openapi::ApiInfo;
use crate::platform::RuntimePlatform;

/// `sam local start-api` listens here too, so local URLs look the same either way.
const DEFAULT_PORT: u16 = 3000;
const PORT_ENV: &str = "PORT";
const ADDR_ENV: &str = "SANDBOX_API_ADDR";

/// Configuration consumed by the runtime before handing the router to Lambda or hyper.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub bind_addr: SocketAddr,
    pub platform: RuntimePlatform,
    pub api_info: ApiInfo,
    /// Strip the `/{stage}` segment lambda_http adds to gateway paths before routing.
    pub strip_stage_prefix: bool,
}

impl RuntimeConfig {
    /// Loads configuration from the process environment.
    ///
    /// Values from a local `.env` file (parsed via [`dotenvy::dotenv_override`]) override whatever is already set in
    /// the process environment, which keeps local runs predictable.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_overrides()?;

        let platform = RuntimePlatform::detect();

        let addr = match env::var(ADDR_ENV) {
            Ok(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidBindAddr(value))?,
            Err(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(addr, resolve_port()),
            platform,
            api_info: ApiInfo::default(),
            strip_stage_prefix: env::var_os(IGNORE_STAGE_IN_PATH_ENV).is_none(),
        })
    }

    /// Returns a builder for programmatic overrides.
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }
}

impl Default for RuntimeConfig {
    /// Binds to `0.0.0.0:3000` as a plain local server.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            platform: RuntimePlatform::Local,
            api_info: ApiInfo::default(),
            strip_stage_prefix: true,
        }
    }
}

/// Builder type for [`RuntimeConfig`].
#[derive(Default, Clone, Debug)]
pub struct RuntimeConfigBuilder {
    bind_addr: Option<SocketAddr>,
    platform: Option<RuntimePlatform>,
    api_info: Option<ApiInfo>,
    strip_stage_prefix: Option<bool>,
}

impl RuntimeConfigBuilder {
    /// Sets the address for the local listener. Ignored on Lambda.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Forces the runtime platform instead of detecting it.
    pub fn platform(mut self, platform: RuntimePlatform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Overrides the info block of the generated OpenAPI document.
    pub fn api_info(mut self, info: ApiInfo) -> Self {
        self.api_info = Some(info);
        self
    }

    /// Controls whether stage-prefixed gateway paths are rewritten before routing.
    pub fn strip_stage_prefix(mut self, strip: bool) -> Self {
        self.strip_stage_prefix = Some(strip);
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> RuntimeConfig {
        let defaults = RuntimeConfig::default();
        RuntimeConfig {
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
            platform: self.platform.unwrap_or(defaults.platform),
            api_info: self.api_info.unwrap_or(defaults.api_info),
            strip_stage_prefix: self.strip_stage_prefix.unwrap_or(defaults.strip_stage_prefix),
        }
    }
}

/// Errors that can occur while building [`RuntimeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address: {0}")]
    InvalidBindAddr(String),
    #[error("failed to load .env overrides: {0}")]
    Dotenv(#[from] DotenvError),
}

fn load_env_overrides() -> Result<(), ConfigError> {
    match dotenvy::dotenv_override() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err)),
    }
}

fn resolve_port() -> u16 {
    env::var(PORT_ENV)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}
