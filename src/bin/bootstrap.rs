use sandbox_api::{RuntimeConfig, SandboxRuntime};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> sandbox_api::Result<()> {
    let config = RuntimeConfig::from_env()?;
    init_tracing(config.platform.is_lambda());

    SandboxRuntime::new(config).start().await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sandbox_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    // CloudWatch stamps every line, and ANSI escapes only clutter it.
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_ansi(false)
                    .without_time()
                    .with_target(true),
            )
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
