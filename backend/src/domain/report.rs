//! Civic issue reports raised by citizens.

use chrono::{DateTime, Utc};

use super::content::{ContentStatus, ContentValidationError, Jurisdiction, validate_text};
use super::{ReportId, UserId};

/// Minimum title length in characters.
pub const TITLE_MIN: usize = 3;
/// Maximum title length in characters.
pub const TITLE_MAX: usize = 120;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX: usize = 2000;
/// Maximum number of photo paths attached to a report.
pub const MAX_PHOTOS: usize = 5;

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Validate latitude (-90..=90) and longitude (-180..=180).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ContentValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ContentValidationError::InvalidLatitude);
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ContentValidationError::InvalidLongitude);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Validated input for a new report.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    title: String,
    description: String,
    location: GeoPoint,
    jurisdiction: Jurisdiction,
    photos: Vec<String>,
}

impl NewReport {
    pub fn new(
        title: &str,
        description: &str,
        location: GeoPoint,
        jurisdiction: Jurisdiction,
        photos: Vec<String>,
    ) -> Result<Self, ContentValidationError> {
        let title = validate_text("title", title, TITLE_MIN, TITLE_MAX)?;
        let description = validate_text("description", description, 1, DESCRIPTION_MAX)?;
        let photos: Vec<String> = photos
            .into_iter()
            .map(|path| path.trim().to_owned())
            .filter(|path| !path.is_empty())
            .collect();
        if photos.len() > MAX_PHOTOS {
            return Err(ContentValidationError::TooManyPhotos { max: MAX_PHOTOS });
        }

        Ok(Self {
            title,
            description,
            location,
            jurisdiction,
            photos,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }
}

/// Stored report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: ReportId,
    pub author: UserId,
    pub title: String,
    pub description: String,
    pub status: ContentStatus,
    pub location: GeoPoint,
    pub jurisdiction: Jurisdiction,
    pub photos: Vec<String>,
    pub upvote_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// A freshly submitted report: pending, without upvotes.
    pub fn submit(id: ReportId, author: UserId, input: NewReport, now: DateTime<Utc>) -> Self {
        Self {
            id,
            author,
            title: input.title,
            description: input.description,
            status: ContentStatus::Pending,
            location: input.location,
            jurisdiction: input.jurisdiction,
            photos: input.photos,
            upvote_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Report plus the caller's upvote state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDetail {
    pub report: Report,
    pub has_user_upvoted: bool,
}
