//! Shared helper utilities for integration tests.
//!
//! Integration tests compile as separate crates, so small helpers live here
//! rather than being copied between suites.

#![allow(dead_code, reason = "each suite uses a different subset")]

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::{embedded_postgres_enabled, handle_cluster_setup_failure};
pub use embedded_postgres::provision_template_database;

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// `postgres::Error`'s `Display` collapses database errors to `db error`, so
/// prefer the SQLSTATE and message from `as_db_error()` when present.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );

    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }

    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }

    summary
}
