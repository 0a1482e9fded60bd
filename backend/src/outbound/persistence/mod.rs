//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Implements the [`UserGateway`](crate::domain::ports::UserGateway) port on
//! PostgreSQL via `diesel-async` and a `bb8` pool.
//!
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//!   to this module; the domain only sees `RawUser` records.
//! - Database failures are mapped to `UserGatewayError` variants, keeping
//!   constraint names so the service can report them.
//!
//! # Example
//!
//! ```no_run
//! use user_directory::outbound::persistence::{
//!     DbPool, DieselUserGateway, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://localhost/users";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let gateway = DieselUserGateway::new(pool);
//! # let _ = gateway;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_user_gateway;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_gateway::DieselUserGateway;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_MAX_SIZE, DbPool, PoolConfig, PoolError};
