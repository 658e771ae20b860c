//! Report HTTP handlers.
//!
//! ```text
//! POST   /api/report
//! GET    /api/report?status=PENDING&municipality=Kathmandu&sort=most_upvoted
//! GET    /api/report/{id}
//! PATCH  /api/report/{id}/status   {"status":"IN_PROGRESS"}   (staff)
//! DELETE /api/report/{id}                                     (author or admin)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ContentRef, Error, GeoPoint, Jurisdiction, NewReport, Report, ReportDetail, ReportId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Authenticated, MaybeAuthenticated};
use crate::inbound::http::content::{
    ContentListQuery, StatusUpdateBody, content_error, mark_opened, parse_status,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Payload for `POST /api/report`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportBody {
    pub title: String,
    pub description: String,
    #[schema(example = 27.7172)]
    pub latitude: f64,
    #[schema(example = 85.324)]
    pub longitude: f64,
    pub municipality: String,
    pub ward: String,
    /// Paths of already uploaded photos, at most five.
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Report as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub author_id: String,
    pub title: String,
    pub description: String,
    #[schema(example = "PENDING")]
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub municipality: String,
    pub ward: String,
    pub photos: Vec<String>,
    pub upvote_count: u32,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Report> for ReportBody {
    fn from(report: Report) -> Self {
        Self {
            id: report.id.to_string(),
            author_id: report.author.to_string(),
            title: report.title,
            description: report.description,
            status: report.status.as_str().to_owned(),
            latitude: report.location.latitude(),
            longitude: report.location.longitude(),
            municipality: report.jurisdiction.municipality().to_owned(),
            ward: report.jurisdiction.ward().to_owned(),
            photos: report.photos,
            upvote_count: report.upvote_count,
            created_at: report.created_at.to_rfc3339(),
            updated_at: report.updated_at.to_rfc3339(),
        }
    }
}

/// Single report with the caller's upvote state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetailBody {
    #[serde(flatten)]
    pub report: ReportBody,
    pub has_user_upvoted: bool,
}

impl From<ReportDetail> for ReportDetailBody {
    fn from(detail: ReportDetail) -> Self {
        Self {
            report: ReportBody::from(detail.report),
            has_user_upvoted: detail.has_user_upvoted,
        }
    }
}

fn parse_new_report(body: CreateReportBody) -> Result<NewReport, Error> {
    let location = GeoPoint::new(body.latitude, body.longitude).map_err(content_error)?;
    let jurisdiction = Jurisdiction::new(&body.municipality, &body.ward).map_err(content_error)?;
    NewReport::new(
        &body.title,
        &body.description,
        location,
        jurisdiction,
        body.photos,
    )
    .map_err(content_error)
}

fn parse_report_id(raw: &str) -> Result<ReportId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(ReportId::from_uuid)
}

/// Submit a new report.
#[utoipa::path(
    post,
    path = "/api/report",
    request_body = CreateReportBody,
    responses(
        (status = 201, description = "Report created", body = ReportBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "createReport",
    security(("BearerAuth" = []))
)]
#[post("")]
pub async fn create_report(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateReportBody>,
) -> ApiResult<HttpResponse> {
    let input = parse_new_report(payload.into_inner())?;
    let report = state.reports.create_report(caller.actor(), input).await?;
    Ok(HttpResponse::Created().json(ReportBody::from(report)))
}

/// List reports.
#[utoipa::path(
    get,
    path = "/api/report",
    params(ContentListQuery),
    responses(
        (status = 200, description = "Reports", body = [ReportBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "listReports",
    security([])
)]
#[get("")]
pub async fn list_reports(
    state: web::Data<HttpState>,
    query: web::Query<ContentListQuery>,
) -> ApiResult<web::Json<Vec<ReportBody>>> {
    let filter = query.into_inner().into_filter()?;
    let reports = state.reports_query.list_reports(filter).await?;
    Ok(web::Json(reports.into_iter().map(ReportBody::from).collect()))
}

/// Fetch one report. Authenticated callers also learn whether they upvoted it.
#[utoipa::path(
    get,
    path = "/api/report/{id}",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Report", body = ReportDetailBody),
        (status = 404, description = "Report not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getReport",
    security([], ("BearerAuth" = []))
)]
#[get("/{id}")]
pub async fn get_report(
    state: web::Data<HttpState>,
    caller: MaybeAuthenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReportDetailBody>> {
    let id = parse_report_id(&path)?;
    let viewer = caller.0.map(|actor| actor.id);
    let detail = state.reports_query.get_report(viewer.clone(), id).await?;
    mark_opened(&state, viewer.as_ref(), ContentRef::Report(id)).await;
    Ok(web::Json(ReportDetailBody::from(detail)))
}

/// Move a report through the workflow.
#[utoipa::path(
    patch,
    path = "/api/report/{id}/status",
    params(("id" = String, Path, description = "Report identifier")),
    request_body = StatusUpdateBody,
    responses(
        (status = 200, description = "Updated report", body = ReportBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not staff for this municipality", body = ErrorSchema),
        (status = 404, description = "Report not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "updateReportStatus",
    security(("BearerAuth" = []))
)]
#[patch("/{id}/status")]
pub async fn update_report_status(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<StatusUpdateBody>,
) -> ApiResult<web::Json<ReportBody>> {
    let id = parse_report_id(&path)?;
    let status = parse_status(&payload)?;
    let report = state
        .reports
        .update_report_status(caller.actor(), id, status)
        .await?;
    Ok(web::Json(ReportBody::from(report)))
}

/// Delete a report with its comments and upvotes.
#[utoipa::path(
    delete,
    path = "/api/report/{id}",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 403, description = "Not the author or an administrator", body = ErrorSchema),
        (status = 404, description = "Report not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "deleteReport",
    security(("BearerAuth" = []))
)]
#[delete("/{id}")]
pub async fn delete_report(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_report_id(&path)?;
    state.reports.delete_report(caller.actor(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the `/report` scope.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/report")
            .service(create_report)
            .service(list_reports)
            .service(get_report)
            .service(update_report_status)
            .service(delete_report),
    );
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
