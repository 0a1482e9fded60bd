//! User directory API handlers.
//!
//! ```text
//! GET    /api/v1/users?query=ann
//! POST   /api/v1/users        {"name":"Ann Lee","phoneNumber":"555-0100"}
//! PUT    /api/v1/users/{id}   {"name":"Ann Lee","phoneNumber":"555-0199"}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Handlers only translate between HTTP and the [`UserDirectory`] port; every
//! rule lives in the domain service.
//!
//! [`UserDirectory`]: crate::domain::ports::UserDirectory

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{RawUser, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserInputSchema, UserSchema};
use crate::inbound::http::state::HttpState;

/// Query string for `GET /api/v1/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchUsersQuery {
    /// Case-insensitive name prefix. Omitted or empty lists every user.
    #[serde(default)]
    pub query: String,
}

/// Search users by name prefix.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_directory::inbound::http::users::search_users;
///
/// let app = App::new().service(search_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(SearchUsersQuery),
    responses(
        (status = 200, description = "Matching users in insertion order", body = [UserSchema]),
        (status = 503, description = "User store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "searchUsers"
)]
#[get("/users")]
pub async fn search_users(
    state: web::Data<HttpState>,
    params: web::Query<SearchUsersQuery>,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.search(&params.query).await?;
    Ok(web::Json(users))
}

/// Create a user. The store assigns the identifier.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserInputSchema,
    responses(
        (status = 201, description = "User created", body = UserSchema),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 409, description = "Email already in use", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "addUser"
)]
#[post("/users")]
pub async fn add_user(
    state: web::Data<HttpState>,
    payload: web::Json<RawUser>,
) -> ApiResult<HttpResponse> {
    let user = state.users.add(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Replace every field of a user. Omitted optional fields are cleared.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = UserInputSchema,
    responses(
        (status = 200, description = "User updated", body = UserSchema),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Constraint violated", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RawUser>,
) -> ApiResult<web::Json<User>> {
    let user = state
        .users
        .update(path.as_str(), payload.into_inner())
        .await?;
    Ok(web::Json(user))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.users.delete(path.as_str()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the user routes on a scope or app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search_users)
        .service(add_user)
        .service(update_user)
        .service(delete_user);
}
