//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed gateway using Diesel ORM.
//! - **memory**: process-local gateway used when no database is configured
//!   and by tests.
//!
//! Adapters are thin translators between domain types and store
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
