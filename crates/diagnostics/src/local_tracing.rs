use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

static IS_TRACING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Initialize the global tracing subscriber from the `YAP_LOG` environment
/// variable, which takes [`EnvFilter`] directive syntax
/// (e.g. `YAP_LOG=yap::resolve=debug`). Defaults to `info`.
pub fn enable_tracing_by_env() {
    if IS_TRACING_ENABLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let filter = EnvFilter::try_from_env("YAP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
