//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the user directory endpoints, the health probes, and
//! the schema wrappers from [`crate::inbound::http::schemas`] that describe
//! domain types without coupling them to utoipa.
//!
//! The generated document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, UserInputSchema, UserSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User directory API",
        description = "Prefix search and CRUD over validated user records.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::search_users,
        crate::inbound::http::users::add_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(UserSchema, UserInputSchema, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "users", description = "User directory operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
