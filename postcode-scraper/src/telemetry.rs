//! Console logging.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Level used when `RUST_LOG` is not set.
///
/// Quiet runs only report warnings and errors.
pub fn default_level(quiet: bool) -> LevelFilter {
    if quiet { LevelFilter::WARN } else { LevelFilter::INFO }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the default level.
pub fn init(quiet: bool) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level(quiet).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().compact().with_target(false))
        .try_init()
}
