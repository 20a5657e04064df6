//! Logging setup shared by tests.

use std::sync::Once;

static INIT: Once = Once::new();

/// Configures logging for the test runner.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
