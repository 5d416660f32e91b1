use tracing_subscriber::{EnvFilter, fmt};

/// Install the global tracing subscriber. Honors `RUST_LOG`, defaulting to
/// `info` so capture progress and skip diagnostics are visible.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .init();
}
