//! Test logging initialization shared by every backend test binary.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Default directives: quiet, and sqlx statement logging off entirely.
const DEFAULT_FILTER: &str = "warn,sqlx=off";

/// Resolve the filter from `TEST_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
fn filter_from_env() -> EnvFilter {
    std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a test-writer subscriber once per process.
///
/// Idempotent and race-safe; a subscriber installed elsewhere wins silently.
///
/// ```bash
/// TEST_LOG=sorter_backend=debug cargo test -p sorter-backend
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(filter_from_env())
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
