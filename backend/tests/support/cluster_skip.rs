//! Helpers controlling whether embedded PostgreSQL suites run.
//!
//! The Diesel gateway suites are opt-in: they run only when
//! `RUN_PG_EMBEDDED=1`. Once enabled, setup failures fail the test unless
//! `SKIP_TEST_CLUSTER` is truthy, so CI breakage is not masked.

fn is_truthy(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Returns true when `RUN_PG_EMBEDDED` opts into embedded PostgreSQL suites.
pub fn embedded_postgres_enabled() -> bool {
    is_truthy("RUN_PG_EMBEDDED")
}

/// Returns true when `SKIP_TEST_CLUSTER` is set to a truthy value.
pub fn should_skip_test_cluster() -> bool {
    is_truthy("SKIP_TEST_CLUSTER")
}

/// Handles embedded cluster setup failures consistently across suites.
///
/// When `SKIP_TEST_CLUSTER` is truthy, prints a skip marker and returns `None`.
/// Otherwise, panics with a clear failure message.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
