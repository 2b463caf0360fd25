//! Test utilities for modpin
//!
//! Shared by unit tests (`#[cfg(test)]`) and the integration tests under
//! `tests/` (through the `test-utils` feature).
//!
//! - [`init_test_logging`] wires `tracing` output into the test harness
//! - [`TestGit`] drives the git CLI to build fixture repositories
//! - [`FixtureRepo`] is a ready-made local remote with a tag, a branch and
//!   known commits

pub mod git_helper;

pub use git_helper::{FixtureRepo, TestGit};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Respects `RUST_LOG` when set, otherwise uses `level`; with neither, tests
/// run silently.
///
/// ```bash
/// RUST_LOG=git=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
