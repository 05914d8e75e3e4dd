use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber for the embedding application.
///
/// Filtering comes from `RUST_LOG`, defaulting to debug output for this
/// crate. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "feed_store=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
