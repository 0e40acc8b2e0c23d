use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_LOG_LEVEL: &str = "info,room_allocation_optimizer=info";

/// Logs to stderr, stdout belongs to the allocation output. `RUST_LOG`
/// overrides the default filter.
pub fn setup_telemetry() {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(stderr_log.with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into()),
    ));
    if let Err(err) = registry.try_init() {
        tracing::warn!("telemetry was already set up: {err}");
    }
}
