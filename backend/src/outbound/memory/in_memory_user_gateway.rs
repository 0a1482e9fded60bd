//! In-memory `UserGateway` implementation.
//!
//! Mirrors the PostgreSQL adapter's observable behaviour: store-assigned UUID
//! ids, insertion-ordered case-insensitive prefix search, a unique email
//! constraint, and `null` for absent optional columns. Every operation holds
//! the lock for its whole duration, so the email check and the write are
//! atomic.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{EMAIL_UNIQUE_CONSTRAINT, UserGateway, UserGatewayError};
use crate::domain::{EmailAddress, RawUser, UserFields, UserId};

#[derive(Debug, Clone)]
struct StoredUser {
    id: Uuid,
    fields: UserFields,
}

impl StoredUser {
    fn to_raw(&self) -> RawUser {
        RawUser::from_stored(
            self.id,
            self.fields.name().to_string(),
            self.fields.phone_number().to_string(),
            self.fields.email().map(ToString::to_string),
            self.fields.location().map(ToString::to_string),
        )
    }
}

/// Gateway keeping users in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserGateway {
    records: Mutex<Vec<StoredUser>>,
}

impl InMemoryUserGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredUser>>, UserGatewayError> {
        self.records
            .lock()
            .map_err(|_| UserGatewayError::connection("in-memory user store lock poisoned"))
    }
}

fn ensure_email_free(
    records: &[StoredUser],
    fields: &UserFields,
    except: Option<Uuid>,
) -> Result<(), UserGatewayError> {
    let Some(email) = fields.email() else {
        return Ok(());
    };
    let taken = records
        .iter()
        .filter(|record| Some(record.id) != except)
        .any(|record| record.fields.email() == Some(email));
    if taken {
        return Err(UserGatewayError::constraint(
            EMAIL_UNIQUE_CONSTRAINT,
            format!("duplicate key value violates unique constraint \"{EMAIL_UNIQUE_CONSTRAINT}\""),
        ));
    }
    Ok(())
}

#[async_trait]
impl UserGateway for InMemoryUserGateway {
    async fn find_by_name_prefix(&self, prefix: &str) -> Result<Vec<RawUser>, UserGatewayError> {
        let needle = prefix.to_lowercase();
        let records = self.lock()?;
        Ok(records
            .iter()
            .filter(|record| {
                let name: &str = record.fields.name().as_ref();
                name.to_lowercase().starts_with(&needle)
            })
            .map(StoredUser::to_raw)
            .collect())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<RawUser>, UserGatewayError> {
        let records = self.lock()?;
        Ok(records
            .iter()
            .find(|record| record.fields.email() == Some(email))
            .map(StoredUser::to_raw))
    }

    async fn insert(&self, fields: &UserFields) -> Result<RawUser, UserGatewayError> {
        let mut records = self.lock()?;
        ensure_email_free(&records, fields, None)?;
        let stored = StoredUser {
            id: Uuid::new_v4(),
            fields: fields.clone(),
        };
        let raw = stored.to_raw();
        records.push(stored);
        Ok(raw)
    }

    async fn update(&self, id: &UserId, fields: &UserFields) -> Result<RawUser, UserGatewayError> {
        let mut records = self.lock()?;
        let target = *id.as_uuid();
        ensure_email_free(&records, fields, Some(target))?;
        let record = records
            .iter_mut()
            .find(|record| record.id == target)
            .ok_or_else(|| UserGatewayError::not_found(id.to_string()))?;
        record.fields = fields.clone();
        Ok(record.to_raw())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserGatewayError> {
        let mut records = self.lock()?;
        let target = *id.as_uuid();
        let before = records.len();
        records.retain(|record| record.id != target);
        if records.len() == before {
            return Err(UserGatewayError::not_found(id.to_string()));
        }
        Ok(())
    }
}
