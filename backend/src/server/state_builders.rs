//! Builders wiring the user directory service to a gateway.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use user_directory::domain::UserDirectoryService;
use user_directory::domain::ports::{UserDirectory, UserGateway};
use user_directory::inbound::http::state::HttpState;
use user_directory::outbound::memory::InMemoryUserGateway;
use user_directory::outbound::persistence::DieselUserGateway;

use super::ServerConfig;

/// Build the directory service over the gateway produced by `make_gateway`
/// when a pool is available, otherwise over process memory.
fn build_user_directory_with_pool<Pool, Gateway>(
    pool: Option<&Pool>,
    make_gateway: impl FnOnce(&Pool) -> Gateway,
) -> Arc<dyn UserDirectory>
where
    Gateway: UserGateway + 'static,
{
    match pool {
        Some(pool) => Arc::new(UserDirectoryService::new(Arc::new(make_gateway(pool)))),
        None => {
            warn!("no database configured; users are kept in process memory");
            Arc::new(UserDirectoryService::new(Arc::new(
                InMemoryUserGateway::new(),
            )))
        }
    }
}

pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let users = build_user_directory_with_pool(config.db_pool(), |pool| {
        DieselUserGateway::new(pool.clone())
    });
    web::Data::new(HttpState::new(users))
}
