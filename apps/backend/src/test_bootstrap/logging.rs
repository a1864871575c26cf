#![cfg(test)]

//! Logging for unit tests; integration tests call the shared helper directly.

/// Idempotent; level comes from `TEST_LOG`, then `RUST_LOG`, then `warn`.
pub fn init() {
    backend_test_support::logging::init();
}
