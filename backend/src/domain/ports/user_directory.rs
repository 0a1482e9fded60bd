//! Driving port for user directory use cases.
//!
//! Inbound adapters call this port to search and maintain users without
//! depending on the record store.

use async_trait::async_trait;

use crate::domain::{Error, RawUser, User};

/// Domain use-case port for the user directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users whose name starts with `query`, ignoring case.
    async fn search(&self, query: &str) -> Result<Vec<User>, Error>;

    /// Validate `data` and create a new user.
    async fn add(&self, data: RawUser) -> Result<User, Error>;

    /// Validate `data` and replace every field of user `id` with it.
    async fn update(&self, id: &str, data: RawUser) -> Result<User, Error>;

    /// Remove user `id`.
    async fn delete(&self, id: &str) -> Result<(), Error>;
}
