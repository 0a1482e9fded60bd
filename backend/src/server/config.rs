//! HTTP server configuration.

use std::net::SocketAddr;

use user_directory::outbound::persistence::DbPool;

/// Where the server keeps user records.
#[derive(Clone, Default)]
pub enum UserStore {
    /// Process memory; records are lost on restart.
    #[default]
    InMemory,
    /// PostgreSQL through the Diesel gateway.
    Postgres(DbPool),
}

/// Builder-style configuration for [`super::create_server`].
#[derive(Clone)]
pub struct ServerConfig {
    bind_addr: SocketAddr,
    store: UserStore,
}

impl ServerConfig {
    /// Serve on `bind_addr`, keeping users in memory until a pool is attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            store: UserStore::default(),
        }
    }

    /// Store users in PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.store = UserStore::Postgres(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// The attached pool, if users are stored in PostgreSQL.
    #[must_use]
    pub fn db_pool(&self) -> Option<&DbPool> {
        match &self.store {
            UserStore::Postgres(pool) => Some(pool),
            UserStore::InMemory => None,
        }
    }

    /// Whether users survive a restart.
    #[must_use]
    pub fn has_db_pool(&self) -> bool {
        self.db_pool().is_some()
    }
}
