//! User data model.
//!
//! Every value object validates on construction, so a [`User`] held by the
//! domain has already passed the directory's schema rules. Optional fields are
//! modelled as `Option` and never hold blank text.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised by the user value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("name must not be empty")]
    EmptyName,
    #[error("phone number must not be empty")]
    EmptyPhoneNumber,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("location must not be empty")]
    EmptyLocation,
}

impl UserValidationError {
    /// Stable machine-readable code reported alongside field issues.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::EmptyName | Self::EmptyPhoneNumber => "required",
            Self::EmptyEmail | Self::EmptyLocation => "empty",
            Self::InvalidId => "invalid_uuid",
            Self::InvalidEmail => "invalid_email",
        }
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an identifier assigned by the record store.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Generates a string newtype that rejects blank input with `$empty`.
macro_rules! non_blank_text {
    ($(#[$meta:meta])* $name:ident, $empty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Validate and construct a [`", stringify!($name), "`].")]
            pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(UserValidationError::$empty);
                }
                Ok(Self(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

non_blank_text!(
    /// Display name and prefix-search key.
    UserName,
    EmptyName
);

non_blank_text!(
    /// Contact phone number. Stored verbatim; no format is imposed.
    PhoneNumber,
    EmptyPhoneNumber
);

non_blank_text!(
    /// Free-text location.
    Location,
    EmptyLocation
);

/// Syntactically valid email address, unique across the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, no whitespace, and a dotted domain part.
        let pattern = r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    ///
    /// # Examples
    /// ```
    /// use user_directory::domain::EmailAddress;
    ///
    /// assert!(EmailAddress::new("ann@example.com").is_ok());
    /// assert!(EmailAddress::new("ann@localhost").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&value) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Every user field except the store-assigned identifier.
///
/// This is the shape accepted by create and update operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    name: UserName,
    phone_number: PhoneNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<EmailAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
}

impl UserFields {
    /// Build the field set from validated components.
    pub fn new(
        name: UserName,
        phone_number: PhoneNumber,
        email: Option<EmailAddress>,
        location: Option<Location>,
    ) -> Self {
        Self {
            name,
            phone_number,
            email,
            location,
        }
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Contact phone number.
    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    /// Email address, if one was given.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Location, if one was given.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

/// Directory user.
///
/// ## Invariants
/// - `id` is a UUID assigned by the record store and never changes.
/// - `name` and `phone_number` are non-blank.
/// - `email` and `location` are either absent or non-blank; `email` is a
///   syntactically valid address.
///
/// Serialises as camelCase JSON with absent optional fields omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    #[serde(flatten)]
    fields: UserFields,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, fields: UserFields) -> Self {
        Self { id, fields }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// All non-identifier fields.
    pub fn fields(&self) -> &UserFields {
        &self.fields
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        self.fields.name()
    }

    /// Contact phone number.
    pub fn phone_number(&self) -> &PhoneNumber {
        self.fields.phone_number()
    }

    /// Email address, if the user has one.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.fields.email()
    }

    /// Location, if the user has one.
    pub fn location(&self) -> Option<&Location> {
        self.fields.location()
    }

    /// Split the user into its identifier and field set.
    pub fn into_parts(self) -> (UserId, UserFields) {
        (self.id, self.fields)
    }
}
