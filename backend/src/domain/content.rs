//! Shared vocabulary for civic content (reports and suggestions).
//!
//! Reports and suggestions share a workflow status, a jurisdiction
//! (municipality plus ward), listing filters and the rule deciding who may
//! move content through the workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Error, ReportId, Role, SuggestionId, User, UserId};

/// Validation errors for civic content inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContentValidationError {
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("latitude must be between -90 and 90")]
    InvalidLatitude,
    #[error("longitude must be between -180 and 180")]
    InvalidLongitude,
    #[error("at most {max} photos may be attached")]
    TooManyPhotos { max: usize },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("status must be one of PENDING, IN_PROGRESS or COMPLETED")]
    UnknownStatus,
    #[error("target type must be report or suggestion")]
    UnknownKind,
    #[error("sort must be one of newest, oldest or most_upvoted")]
    UnknownSort,
    #[error("limit must be between 1 and {max}")]
    InvalidLimit { max: u32 },
    #[error("offset must be at most {max}")]
    InvalidOffset { max: u64 },
}

/// Workflow status shared by reports and suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentStatus {
    Pending,
    InProgress,
    Completed,
}

impl ContentStatus {
    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Human-readable label used in notification messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = ContentValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(ContentValidationError::UnknownStatus),
        }
    }
}

/// Kind of content an upvote, comment or notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Report,
    Suggestion,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Suggestion => "suggestion",
        }
    }
}

impl FromStr for ContentKind {
    type Err = ContentValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "report" => Ok(Self::Report),
            "suggestion" => Ok(Self::Suggestion),
            _ => Err(ContentValidationError::UnknownKind),
        }
    }
}

/// Reference to a single report or suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentRef {
    Report(ReportId),
    Suggestion(SuggestionId),
}

impl ContentRef {
    /// Build a reference from its storage parts.
    pub fn from_parts(kind: ContentKind, id: Uuid) -> Self {
        match kind {
            ContentKind::Report => Self::Report(ReportId::from_uuid(id)),
            ContentKind::Suggestion => Self::Suggestion(SuggestionId::from_uuid(id)),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Report(_) => ContentKind::Report,
            Self::Suggestion(_) => ContentKind::Suggestion,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Report(id) => *id.as_uuid(),
            Self::Suggestion(id) => *id.as_uuid(),
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind().as_str(), self.id())
    }
}

/// Municipality and ward that own a piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jurisdiction {
    municipality: String,
    ward: String,
}

impl Jurisdiction {
    pub fn new(
        municipality: impl AsRef<str>,
        ward: impl AsRef<str>,
    ) -> Result<Self, ContentValidationError> {
        let municipality = municipality.as_ref().trim();
        let ward = ward.as_ref().trim();
        if municipality.is_empty() {
            return Err(ContentValidationError::Empty {
                field: "municipality",
            });
        }
        if ward.is_empty() {
            return Err(ContentValidationError::Empty { field: "ward" });
        }
        Ok(Self {
            municipality: municipality.to_owned(),
            ward: ward.to_owned(),
        })
    }

    pub fn municipality(&self) -> &str {
        &self.municipality
    }

    pub fn ward(&self) -> &str {
        &self.ward
    }
}

/// Trim `raw` and enforce a character-count window.
pub fn validate_text(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> Result<String, ContentValidationError> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if length == 0 {
        return Err(ContentValidationError::Empty { field });
    }
    if length < min {
        return Err(ContentValidationError::TooShort { field, min });
    }
    if length > max {
        return Err(ContentValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Default number of items per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Largest offset storage can address (`i64::MAX`).
pub const MAX_PAGE_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl PageRequest {
    /// Validate an optional limit/offset pair, applying defaults.
    pub fn new(limit: Option<u32>, offset: Option<u64>) -> Result<Self, ContentValidationError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(ContentValidationError::InvalidLimit {
                max: MAX_PAGE_LIMIT,
            });
        }
        let offset = offset.unwrap_or(0);
        if offset > MAX_PAGE_OFFSET {
            return Err(ContentValidationError::InvalidOffset {
                max: MAX_PAGE_OFFSET,
            });
        }
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Listing order for reports and suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentSort {
    #[default]
    Newest,
    Oldest,
    MostUpvoted,
}

impl FromStr for ContentSort {
    type Err = ContentValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "most_upvoted" => Ok(Self::MostUpvoted),
            _ => Err(ContentValidationError::UnknownSort),
        }
    }
}

/// Listing filter for reports and suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub status: Option<ContentStatus>,
    pub municipality: Option<String>,
    pub ward: Option<String>,
    pub author: Option<UserId>,
    pub sort: ContentSort,
    pub page: PageRequest,
}

/// Decide whether `staff` may change the status of content in `jurisdiction`.
///
/// Administrators may triage anything; municipality staff only content in
/// their own municipality; citizens never.
pub fn authorize_status_change(staff: &User, jurisdiction: &Jurisdiction) -> Result<(), Error> {
    match staff.role() {
        Role::Admin => Ok(()),
        Role::Municipality => {
            let own = staff
                .municipality()
                .is_some_and(|m| m.eq_ignore_ascii_case(jurisdiction.municipality()));
            if own {
                Ok(())
            } else {
                Err(Error::forbidden(
                    "You can only update content in your own municipality.",
                ))
            }
        }
        Role::User => Err(Error::forbidden("Staff access required.")),
    }
}
