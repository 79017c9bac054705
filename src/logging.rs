//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "SKELETON_LOG";

/// Filter from `SKELETON_LOG`, then `RUST_LOG`, then `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a global fmt subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Subscriber for tests; output goes through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("skeleton=debug"))
        .with_test_writer()
        .try_init();
}
