//! PostgreSQL-backed `UserGateway` implementation using Diesel ORM.
//!
//! Each port operation is a single statement. Inserts and updates use
//! `RETURNING` so the stored record comes back without a second round trip.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserGateway, UserGatewayError};
use crate::domain::{EmailAddress, RawUser, UserFields, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`UserGateway`] port.
#[derive(Clone)]
pub struct DieselUserGateway {
    pool: DbPool,
}

impl DieselUserGateway {
    /// Create a new gateway with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

diesel::define_sql_function! {
    /// PostgreSQL `lower(text)`.
    fn lower(x: Text) -> Text;
}

/// Build a `LIKE` pattern matching names that start with `prefix`.
///
/// `%`, `_` and the escape character itself are escaped so the prefix is
/// matched literally (PostgreSQL's default escape character is `\`).
pub(crate) fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Users whose name starts with `prefix`, ignoring case, oldest first.
///
/// Both sides are folded with `lower()` so `users_name_lower_idx` serves the
/// match.
fn name_prefix_query(prefix: &str) -> users::BoxedQuery<'static, Pg> {
    users::table
        .filter(lower(users::name).like(lower(prefix_pattern(prefix))))
        .order((users::created_at.asc(), users::id.asc()))
        .into_boxed()
}

#[async_trait]
impl UserGateway for DieselUserGateway {
    async fn find_by_name_prefix(&self, prefix: &str) -> Result<Vec<RawUser>, UserGatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = name_prefix_query(prefix)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(prefix, matches = rows.len(), "user prefix search");
        Ok(rows.into_iter().map(RawUser::from).collect())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<RawUser>, UserGatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(RawUser::from))
    }

    async fn insert(&self, fields: &UserFields) -> Result<RawUser, UserGatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(&NewUserRow::from(fields))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(RawUser::from(row))
    }

    async fn update(&self, id: &UserId, fields: &UserFields) -> Result<RawUser, UserGatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = UserChangeset::from(fields);
        let row: Option<UserRow> = diesel::update(users::table.find(*id.as_uuid()))
            .set((&changeset, users::updated_at.eq(diesel::dsl::now)))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(RawUser::from)
            .ok_or_else(|| UserGatewayError::not_found(id.to_string()))
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserGatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(UserGatewayError::not_found(id.to_string()));
        }
        Ok(())
    }
}
