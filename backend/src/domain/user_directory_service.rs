//! User directory domain service.
//!
//! Implements the [`UserDirectory`] driving port on top of a [`UserGateway`].
//! Every record read from the gateway is normalised and validated before it
//! reaches a caller, and every payload is validated before it reaches the
//! gateway.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::ports::{UserDirectory, UserGateway, UserGatewayError};
use crate::domain::user_schema::FIELD_EMAIL;
use crate::domain::{
    EmailAddress, Error, RawUser, User, UserFields, UserId, UserSchemaError, normalize_absent,
    parse_for_create, parse_full,
};

/// Message returned when an email is already held by another user.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "A user with this email already exists.";

/// User directory service implementing the driving port.
#[derive(Clone)]
pub struct UserDirectoryService<G> {
    gateway: Arc<G>,
}

impl<G> UserDirectoryService<G> {
    /// Create a new service over the given gateway.
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

impl<G> UserDirectoryService<G>
where
    G: UserGateway,
{
    fn map_gateway_error(error: UserGatewayError) -> Error {
        debug!(kind = error.kind(), %error, "user store operation failed");
        match error {
            UserGatewayError::Connection { message } => {
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserGatewayError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
            UserGatewayError::NotFound { id } => Self::user_not_found(&id),
            UserGatewayError::Constraint {
                constraint,
                message,
            } => Error::conflict(format!("user violates constraint {constraint}: {message}"))
                .with_details(json!({
                    "code": "constraint_violation",
                    "constraint": constraint,
                })),
        }
    }

    fn user_not_found(id: &str) -> Error {
        Error::not_found(format!("user {id} not found")).with_details(json!({
            "code": "user_not_found",
            "id": id,
        }))
    }

    fn validation_failed(err: UserSchemaError) -> Error {
        Error::invalid_request("user record failed validation").with_details(json!({
            "code": "validation_failed",
            "issues": err.issues(),
        }))
    }

    fn duplicate_email() -> Error {
        Error::conflict(DUPLICATE_EMAIL_MESSAGE).with_details(json!({
            "code": "duplicate_email",
        }))
    }

    /// Unparseable identifiers cannot name a stored record.
    fn parse_id(id: &str) -> Result<UserId, Error> {
        UserId::new(id).map_err(|_| Self::user_not_found(id))
    }

    /// The email a new record would claim, when it is well formed. The
    /// uniqueness check runs on this before the rest of the record is
    /// validated.
    fn candidate_email(data: &RawUser) -> Option<EmailAddress> {
        let text = data.get(FIELD_EMAIL)?.as_str()?;
        EmailAddress::new(text).ok()
    }

    fn parse_payload(data: RawUser) -> Result<UserFields, Error> {
        parse_for_create(&normalize_absent(data)).map_err(Self::validation_failed)
    }

    fn stored_user(raw: RawUser) -> Result<User, Error> {
        parse_full(&normalize_absent(raw)).map_err(|err| {
            error!(issues = ?err.issues(), "stored user record failed validation");
            Error::internal("stored user record failed validation")
        })
    }
}

#[async_trait]
impl<G> UserDirectory for UserDirectoryService<G>
where
    G: UserGateway,
{
    async fn search(&self, query: &str) -> Result<Vec<User>, Error> {
        let records = self
            .gateway
            .find_by_name_prefix(query)
            .await
            .map_err(Self::map_gateway_error)?;

        records.into_iter().map(Self::stored_user).collect()
    }

    async fn add(&self, data: RawUser) -> Result<User, Error> {
        let data = normalize_absent(data);

        if let Some(email) = Self::candidate_email(&data) {
            let existing = self
                .gateway
                .find_by_email(&email)
                .await
                .map_err(Self::map_gateway_error)?;
            if existing.is_some() {
                return Err(Self::duplicate_email());
            }
        }

        let fields = parse_for_create(&data).map_err(Self::validation_failed)?;
        let stored = self
            .gateway
            .insert(&fields)
            .await
            .map_err(Self::map_gateway_error)?;
        let user = Self::stored_user(stored)?;
        info!(user_id = %user.id(), "user added");
        Ok(user)
    }

    async fn update(&self, id: &str, data: RawUser) -> Result<User, Error> {
        let id = Self::parse_id(id)?;
        let fields = Self::parse_payload(data)?;

        let stored = self
            .gateway
            .update(&id, &fields)
            .await
            .map_err(Self::map_gateway_error)?;
        let user = Self::stored_user(stored)?;
        info!(user_id = %user.id(), "user updated");
        Ok(user)
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        let id = Self::parse_id(id)?;
        self.gateway
            .delete(&id)
            .await
            .map_err(Self::map_gateway_error)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_directory_service_tests.rs"]
mod tests;
