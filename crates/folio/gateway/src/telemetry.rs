use crate::config::LoggingConfig;
use crate::{GatewayError, GatewayResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. `RUST_LOG` wins over
/// `logging.level` when set.
pub fn init_tracing(logging: &LoggingConfig) -> GatewayResult<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.clone().into());

    let installed = if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    installed.map_err(|e| GatewayError::Config(format!("failed to install tracing subscriber: {e}")))
}
