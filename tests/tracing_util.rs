use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Thread-local subscriber that routes library logs through the test harness,
/// so `cargo test -- --nocapture` shows them next to the failing assertion.
pub struct TestTracing {
    _guard: DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let fmt = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true);
        let subscriber = Registry::default()
            .with(EnvFilter::new("crudrules=trace"))
            .with(fmt);
        Self {
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }
}
