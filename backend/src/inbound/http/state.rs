//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the [`UserDirectory`] driving port and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UserDirectory;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserDirectory>,
}

impl HttpState {
    /// Construct state around a user directory implementation.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use user_directory::domain::UserDirectoryService;
    /// use user_directory::inbound::http::state::HttpState;
    /// use user_directory::outbound::memory::InMemoryUserGateway;
    ///
    /// let service = UserDirectoryService::new(Arc::new(InMemoryUserGateway::new()));
    /// let state = HttpState::new(Arc::new(service));
    /// let _users = state.users.clone();
    /// ```
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}
