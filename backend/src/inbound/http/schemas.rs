//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their JSON shape and register under the domain type's
//! name via `#[schema(as = ...)]`.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested user does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The email is already taken or a store constraint rejected the write.
    #[schema(rename = "conflict")]
    Conflict,
    /// The user store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "A user with this email already exists.")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Structured details: `code` plus `issues`, `constraint`, or `id`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Store-assigned identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "Ann Lee")]
    name: String,
    #[schema(example = "555-0100")]
    phone_number: String,
    /// Omitted when absent.
    #[schema(example = "ann@example.com")]
    email: Option<String>,
    /// Omitted when absent.
    location: Option<String>,
}

/// OpenAPI schema for the create and update request body.
///
/// `null` and blank optional fields are treated as absent; `id` is ignored.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserFields, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserInputSchema {
    #[schema(example = "Ann Lee")]
    name: String,
    #[schema(example = "555-0100")]
    phone_number: String,
    #[schema(example = "ann@example.com")]
    email: Option<String>,
    location: Option<String>,
}
