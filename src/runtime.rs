use axum::Router;
use tokio::net::TcpListener;

use crate::app::app_with_config;
use crate::config::RuntimeConfig;
use crate::error::{Result, SandboxError};
use crate::platform::RuntimePlatform;

/// Runtime that hands a router either to the Lambda runtime API or to a local listener.
pub struct SandboxRuntime {
    config: RuntimeConfig,
}

impl SandboxRuntime {
    /// Creates a runtime with the provided configuration.
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Builds the application router for this runtime's configuration and serves it.
    pub async fn start(self) -> Result<()> {
        let router = app_with_config(&self.config)?;
        serve(router, self.config).await
    }

    /// Consumes the runtime and starts serving the supplied router.
    pub async fn serve(self, router: Router) -> Result<()> {
        serve(router, self.config).await
    }
}

/// Serves the router with the provided configuration.
pub async fn serve(router: Router, config: RuntimeConfig) -> Result<()> {
    match &config.platform {
        RuntimePlatform::Lambda(lambda) => {
            tracing::info!(
                function = lambda.function_name.as_deref(),
                sam_local = lambda.sam_local,
                "starting lambda runtime"
            );
            lambda_http::run(router).await.map_err(SandboxError::Lambda)
        }
        RuntimePlatform::Local => {
            let listener = TcpListener::bind(config.bind_addr).await?;
            tracing::info!(addr = %config.bind_addr, "sandbox-api listening");

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok(())
        }
    }
}

/// Loads [`RuntimeConfig`] from the environment and serves the application.
pub async fn run() -> Result<()> {
    let config = RuntimeConfig::from_env()?;
    SandboxRuntime::new(config).start().await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutting down");
}
