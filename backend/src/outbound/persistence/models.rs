//! Internal Diesel row structs for the `users` table.
//!
//! These types never cross the adapter boundary: the gateway converts them to
//! [`RawUser`] records on the way out and builds them from [`UserFields`] on
//! the way in.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{RawUser, UserFields};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub location: Option<String>,
    #[expect(dead_code, reason = "ordering column, not part of the user record")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "audit column, not part of the user record")]
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for RawUser {
    fn from(row: UserRow) -> Self {
        RawUser::from_stored(row.id, row.name, row.phone_number, row.email, row.location)
    }
}

/// Insertable struct for creating user records. The id is store-assigned.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub phone_number: &'a str,
    pub email: Option<&'a str>,
    pub location: Option<&'a str>,
}

impl<'a> From<&'a UserFields> for NewUserRow<'a> {
    fn from(fields: &'a UserFields) -> Self {
        Self {
            name: fields.name().as_ref(),
            phone_number: fields.phone_number().as_ref(),
            email: fields.email().map(AsRef::as_ref),
            location: fields.location().map(AsRef::as_ref),
        }
    }
}

/// Changeset replacing every non-identifier column.
///
/// `None` writes NULL so an omitted optional field is cleared.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub name: &'a str,
    pub phone_number: &'a str,
    pub email: Option<&'a str>,
    pub location: Option<&'a str>,
}

impl<'a> From<&'a UserFields> for UserChangeset<'a> {
    fn from(fields: &'a UserFields) -> Self {
        let NewUserRow {
            name,
            phone_number,
            email,
            location,
        } = NewUserRow::from(fields);
        Self {
            name,
            phone_number,
            email,
            location,
        }
    }
}
