//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes the table.

diesel::table! {
    /// Directory users.
    ///
    /// `email` carries the unique constraint `users_email_key`; PostgreSQL
    /// permits any number of NULL emails.
    users (id) {
        /// Primary key: UUID v4 assigned by `gen_random_uuid()`.
        id -> Uuid,
        name -> Text,
        phone_number -> Text,
        email -> Nullable<Text>,
        location -> Nullable<Text>,
        /// Insertion timestamp; orders search results.
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
