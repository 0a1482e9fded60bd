//! Port for the record store gateway.
//!
//! The [`UserGateway`] trait is the only way the domain reaches stored user
//! records. Each operation is a single round trip to the store. Records come
//! back as [`RawUser`] values in the store's shape (absent optional columns
//! are `null`); the service normalises and validates them.

use async_trait::async_trait;

use crate::domain::{EmailAddress, RawUser, UserFields, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record store gateway adapters.
    pub enum UserGatewayError {
        /// The store could not be reached or a connection could not be
        /// checked out.
        Connection { message: String } => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
        /// No record has the requested identifier.
        NotFound { id: String } => "user {id} not found",
        /// A unique, not-null, or check constraint rejected the write.
        Constraint { constraint: String, message: String } =>
            "user store constraint {constraint} violated: {message}",
    }
}

/// Gateway to the user record store.
///
/// Implementations must enforce that a non-absent email is unique across all
/// records, reporting a violation as [`UserGatewayError::Constraint`] with the
/// constraint name [`EMAIL_UNIQUE_CONSTRAINT`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// Records whose name starts with `prefix`, ignoring case.
    ///
    /// The prefix is matched literally: wildcard characters carry no special
    /// meaning. Results are returned in insertion order. An empty prefix
    /// matches every record.
    async fn find_by_name_prefix(&self, prefix: &str) -> Result<Vec<RawUser>, UserGatewayError>;

    /// The record holding `email`, if any.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<RawUser>, UserGatewayError>;

    /// Store a new record and return it with its assigned identifier.
    async fn insert(&self, fields: &UserFields) -> Result<RawUser, UserGatewayError>;

    /// Replace every non-identifier field of record `id`.
    async fn update(&self, id: &UserId, fields: &UserFields)
    -> Result<RawUser, UserGatewayError>;

    /// Remove record `id`.
    async fn delete(&self, id: &UserId) -> Result<(), UserGatewayError>;
}

/// Name of the unique constraint guarding `email`.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";
