//! Request pieces shared by the report and suggestion handlers.

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ContentFilter, ContentRef, ContentSort, ContentStatus, ContentValidationError, Error,
    PageRequest, UserId,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field, parse_optional_value, parse_uuid,
};

/// Query string accepted by the report and suggestion listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ContentListQuery {
    /// `PENDING`, `IN_PROGRESS` or `COMPLETED`.
    pub status: Option<String>,
    /// Case-insensitive exact municipality match.
    pub municipality: Option<String>,
    /// Case-insensitive exact ward match.
    pub ward: Option<String>,
    /// Author account id.
    pub author: Option<String>,
    /// `newest` (default), `oldest` or `most_upvoted`.
    pub sort: Option<String>,
    /// Page size, 1 to 100 (default 20).
    pub limit: Option<String>,
    /// Items to skip.
    pub offset: Option<String>,
}

/// Body of the status change endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateBody {
    #[schema(example = "IN_PROGRESS")]
    pub status: String,
}

/// Field a content validation failure refers to, in wire casing.
pub(crate) fn content_field(error: &ContentValidationError) -> FieldName {
    match error {
        ContentValidationError::TooShort { field, .. }
        | ContentValidationError::TooLong { field, .. }
        | ContentValidationError::Empty { field } => FieldName::new(*field),
        ContentValidationError::InvalidLatitude => FieldName::new("latitude"),
        ContentValidationError::InvalidLongitude => FieldName::new("longitude"),
        ContentValidationError::TooManyPhotos { .. } => FieldName::new("photos"),
        ContentValidationError::UnknownStatus => FieldName::new("status"),
        ContentValidationError::UnknownKind => FieldName::new("targetType"),
        ContentValidationError::UnknownSort => FieldName::new("sort"),
        ContentValidationError::InvalidLimit { .. } => FieldName::new("limit"),
        ContentValidationError::InvalidOffset { .. } => FieldName::new("offset"),
    }
}

pub(crate) fn content_error(error: ContentValidationError) -> Error {
    invalid_field(content_field(&error), error)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::to_owned)
}

/// Mark the viewer's notifications about `target` read after a detail view.
///
/// The detail has already been served, so failures are only logged.
pub(crate) async fn mark_opened(
    state: &HttpState,
    viewer: Option<&UserId>,
    target: ContentRef,
) {
    let Some(viewer) = viewer else {
        return;
    };
    if let Err(error) = state.notifications.mark_target_read(viewer, target).await {
        warn!(%error, user_id = %viewer, %target, "failed to mark opened content read");
    }
}

/// Parse pagination parameters.
pub(crate) fn parse_page(limit: Option<&str>, offset: Option<&str>) -> Result<PageRequest, Error> {
    let limit: Option<u32> = parse_optional_value(limit, FieldName::new("limit"))?;
    let offset: Option<u64> = parse_optional_value(offset, FieldName::new("offset"))?;
    PageRequest::new(limit, offset).map_err(content_error)
}

impl ContentListQuery {
    /// Validate the query into a domain filter.
    pub(crate) fn into_filter(self) -> Result<ContentFilter, Error> {
        let status: Option<ContentStatus> =
            parse_optional_value(self.status.as_deref(), FieldName::new("status"))?;
        let sort: Option<ContentSort> =
            parse_optional_value(self.sort.as_deref(), FieldName::new("sort"))?;
        let author = self
            .author
            .as_deref()
            .map(|raw| parse_uuid(raw, FieldName::new("author")).map(UserId::from_uuid))
            .transpose()?;
        Ok(ContentFilter {
            status,
            municipality: non_blank(self.municipality.as_deref()),
            ward: non_blank(self.ward.as_deref()),
            author,
            sort: sort.unwrap_or_default(),
            page: parse_page(self.limit.as_deref(), self.offset.as_deref())?,
        })
    }
}

/// Parse the body of a status change.
pub(crate) fn parse_status(body: &StatusUpdateBody) -> Result<ContentStatus, Error> {
    body.status.parse().map_err(content_error)
}
