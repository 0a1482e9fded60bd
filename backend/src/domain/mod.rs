//! Domain primitives, services, and ports.
//!
//! Purpose: define the user directory's strongly typed entities, the schema
//! that validates raw records into them, and the service that implements the
//! directory use cases. Nothing here depends on HTTP or the datastore.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, UserFields and their value objects.
//! - RawUser with `normalize_absent`, `parse_full`, `parse_for_create`.
//! - UserDirectoryService: implements [`ports::UserDirectory`].
//! - TraceId: request-scoped correlation identifier.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_directory_service;
pub mod user_schema;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, Location, PhoneNumber, User, UserFields, UserId, UserName, UserValidationError,
};
pub use self::user_directory_service::{DUPLICATE_EMAIL_MESSAGE, UserDirectoryService};
pub use self::user_schema::{
    FieldIssue, RawUser, UserSchemaError, normalize_absent, parse_for_create, parse_full,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use user_directory::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("missing"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
