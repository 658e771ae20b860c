//! Account holders: citizens, municipality staff and administrators.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("full name must not be empty")]
    EmptyFullName,
    #[error("full name must be at most {max} characters")]
    FullNameTooLong { max: usize },
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("phone number may only contain digits, spaces, '+' or '-' (7 to 20 characters)")]
    InvalidPhone,
    #[error("role must be one of USER, MUNICIPALITY or ADMIN")]
    UnknownRole,
    #[error("municipality accounts require a municipality and ward")]
    MissingJurisdiction,
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

    /// Wrap a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
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

/// Account role governing what a user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Citizen submitting reports, suggestions, comments and upvotes.
    User,
    /// Municipality staff allowed to triage content in their jurisdiction.
    Municipality,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Municipality => "MUNICIPALITY",
            Self::Admin => "ADMIN",
        }
    }

    /// Whether the role may change the status of civic content.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Municipality | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "MUNICIPALITY" => Ok(Self::Municipality),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Case-insensitive email address, stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl Email {
    /// Normalise and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.len() > 254 || !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maximum length of a full name.
pub const FULL_NAME_MAX: usize = 100;

/// Person's full name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    /// Validate a full name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(UserValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Validate an optional phone number, returning the trimmed value.
pub fn validate_phone(raw: Option<&str>) -> Result<Option<String>, UserValidationError> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    let length = value.chars().count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' '));
    if !(7..=20).contains(&length) || !allowed {
        return Err(UserValidationError::InvalidPhone);
    }
    Ok(Some(value.to_owned()))
}

/// Inputs required to build a [`User`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub full_name: FullName,
    pub email: Email,
    pub role: Role,
    pub verified: bool,
    pub municipality: Option<String>,
    pub ward: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub citizenship_document: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Registered account.
///
/// ## Invariants
/// - `MUNICIPALITY` accounts always carry both a municipality and a ward.
/// - `email` is unique across accounts (enforced by storage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    full_name: FullName,
    email: Email,
    role: Role,
    verified: bool,
    municipality: Option<String>,
    ward: Option<String>,
    phone: Option<String>,
    profile_picture: Option<String>,
    citizenship_document: Option<String>,
    created_at: DateTime<Utc>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

impl User {
    /// Build a user from validated parts.
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        let municipality = non_blank(draft.municipality);
        let ward = non_blank(draft.ward);
        if draft.role == Role::Municipality && (municipality.is_none() || ward.is_none()) {
            return Err(UserValidationError::MissingJurisdiction);
        }

        Ok(Self {
            id: draft.id,
            full_name: draft.full_name,
            email: draft.email,
            role: draft.role,
            verified: draft.verified,
            municipality,
            ward,
            phone: draft.phone,
            profile_picture: non_blank(draft.profile_picture),
            citizenship_document: non_blank(draft.citizenship_document),
            created_at: draft.created_at,
        })
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn municipality(&self) -> Option<&str> {
        self.municipality.as_deref()
    }

    pub fn ward(&self) -> Option<&str> {
        self.ward.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn profile_picture(&self) -> Option<&str> {
        self.profile_picture.as_deref()
    }

    pub fn citizenship_document(&self) -> Option<&str> {
        self.citizenship_document.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Return a copy with the verified flag set.
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Apply a validated profile update.
    pub fn apply(mut self, update: &ProfileUpdate) -> Self {
        if let Some(full_name) = &update.full_name {
            self.full_name = full_name.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(picture) = &update.profile_picture {
            self.profile_picture = Some(picture.clone());
        }
        if let Some(document) = &update.citizenship_document {
            self.citizenship_document = Some(document.clone());
        }
        self
    }
}

/// Partial profile update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<FullName>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub citizenship_document: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.profile_picture.is_none()
            && self.citizenship_document.is_none()
    }
}

#[cfg(test)]
mod tests;
