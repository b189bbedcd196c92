//! Shared test utilities for the agent crate.

/// Initialize logging for tests (once per process, parallel-safe).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
