use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::request::RequestType;
use crate::service::RequestService;
use crate::store::RequestStore;
use crate::utils::{clock, report};
use actix_web::{HttpResponse, Responder, http::header, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateRequest {
    #[schema(example = "LEAVE")]
    /// `LEAVE` or `OVERTIME`
    #[serde(rename = "type")]
    pub request_type: String,
    #[schema(example = "2024-03-01T09:00:00Z", format = "date-time")]
    pub start_date: String,
    #[schema(example = "2024-03-02T17:00:00Z", format = "date-time")]
    pub end_date: String,
    #[schema(example = "medical")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectRequest {
    #[schema(example = "Team is short staffed that week")]
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    /// Month selector, `YYYY-MM`
    #[param(example = "2024-03")]
    pub month: Option<String>,
}

fn invalid_month() -> AppError {
    AppError::validation("invalid month format, use YYYY-MM")
}

/// Month selector and its `[from, to)` window; a missing month means the current one.
fn month_or_current(
    query: &MonthQuery,
    now: DateTime<Utc>,
) -> Result<(String, DateTime<Utc>, DateTime<Utc>), AppError> {
    let month = match query.month.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => clock::current_month(now),
    };
    let (from, to) = clock::month_window(&month).ok_or_else(invalid_month)?;
    Ok((month, from, to))
}

fn required_month(query: &MonthQuery) -> Result<(String, DateTime<Utc>, DateTime<Utc>), AppError> {
    let month = match query.month.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => return Err(AppError::validation("month query required, format YYYY-MM")),
    };
    let (from, to) = clock::month_window(&month).ok_or_else(invalid_month)?;
    Ok((month, from, to))
}

fn parse_request_type(value: &str) -> Result<RequestType, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::validation("invalid request type. Allowed: LEAVE, OVERTIME"))
}

/* =========================
Create request
========================= */
#[utoipa::path(
    post,
    path = "/api/requests",
    request_body(
        content = CreateRequest,
        description = "Leave or overtime request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Request submitted", body = crate::model::request::Request),
        (status = 400, description = "Invalid input", body = Object, example = json!({
            "error": "start must precede end"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn create_request<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
    payload: web::Json<CreateRequest>,
) -> actix_web::Result<impl Responder> {
    let request_type = parse_request_type(&payload.request_type)?;
    let start = clock::parse_datetime(&payload.start_date)
        .ok_or_else(|| AppError::validation("invalid start date format (RFC3339 required)"))?;
    let end = clock::parse_datetime(&payload.end_date)
        .ok_or_else(|| AppError::validation("invalid end date format (RFC3339 required)"))?;

    let created = requests
        .create_request(auth.user_id, request_type, start, end, &payload.reason, Utc::now())
        .await?;

    Ok(HttpResponse::Created().json(created))
}

/// The caller's own requests, newest first
#[utoipa::path(
    get,
    path = "/api/requests/my",
    responses(
        (status = 200, description = "Own requests", body = [crate::model::request::Request]),
        (status = 401, description = "Unauthorized")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn my_requests<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
) -> actix_web::Result<impl Responder> {
    let items = requests.get_my_requests(auth.user_id).await?;

    Ok(HttpResponse::Ok().json(items))
}

/// Pending requests awaiting a decision, oldest first (approvers only)
#[utoipa::path(
    get,
    path = "/api/requests/approvals",
    responses(
        (status = 200, description = "Pending requests", body = [crate::model::request::Request]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn pending_requests<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let items = requests.get_pending_requests().await?;

    Ok(HttpResponse::Ok().json(items))
}

/* =========================
Approve request (approvers)
========================= */
#[utoipa::path(
    post,
    path = "/api/requests/{id}/approve",
    params(("id" = u64, Path, description = "ID of the request to approve")),
    responses(
        (status = 200, description = "Request approved", body = Object, example = json!({
            "message": "Request approved"
        })),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already processed", body = Object, example = json!({
            "error": "request is not pending"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn approve_request<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let request_id = path.into_inner();
    requests
        .approve_request(request_id, auth.user_id, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Request approved"
    })))
}

/* =========================
Reject request (approvers)
========================= */
#[utoipa::path(
    post,
    path = "/api/requests/{id}/reject",
    params(("id" = u64, Path, description = "ID of the request to reject")),
    request_body(content = RejectRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Request rejected", body = Object, example = json!({
            "message": "Request rejected"
        })),
        (status = 400, description = "Rejection reason missing", body = Object, example = json!({
            "error": "rejection reason is required"
        })),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn reject_request<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
    path: web::Path<u64>,
    payload: web::Json<RejectRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let request_id = path.into_inner();
    requests
        .reject_request(request_id, auth.user_id, &payload.reason, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Request rejected"
    })))
}

/// System-wide request counts for a month (approvers only)
#[utoipa::path(
    get,
    path = "/api/requests/summary",
    params(MonthQuery),
    responses(
        (status = 200, description = "Request summary", body = crate::model::request::RequestSummary),
        (status = 400, description = "Malformed month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn summary<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let (_, from, to) = month_or_current(&query, Utc::now())?;
    let summary = requests.get_summary_between(from, to).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// The caller's request counts for a month
#[utoipa::path(
    get,
    path = "/api/requests/summary/my",
    params(MonthQuery),
    responses(
        (status = 200, description = "Own request summary", body = crate::model::request::RequestSummary),
        (status = 400, description = "Malformed month"),
        (status = 401, description = "Unauthorized")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn my_summary<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let (_, from, to) = month_or_current(&query, Utc::now())?;
    let summary = requests.get_my_summary_between(auth.user_id, from, to).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Requests decided during a month (approvers only)
#[utoipa::path(
    get,
    path = "/api/requests/processed",
    params(MonthQuery),
    responses(
        (status = 200, description = "Processed requests, newest decision first", body = [crate::model::request::Request]),
        (status = 400, description = "Missing or malformed month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn processed<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let (_, from, to) = required_month(&query)?;
    let items = requests.get_processed_between(from, to).await?;

    Ok(HttpResponse::Ok().json(items))
}

/// Spreadsheet of requests decided during a month (approvers only)
#[utoipa::path(
    get,
    path = "/api/requests/processed/export",
    params(MonthQuery),
    responses(
        (status = 200, description = "XLSX workbook sent as an attachment named requests_<month>.xlsx"),
        (status = 400, description = "Missing or malformed month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("cookie_auth" = [])),
    tag = "Requests"
)]
pub async fn export_processed<S: RequestStore + 'static>(
    auth: AuthUser,
    requests: web::Data<RequestService<S>>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let (month, from, to) = required_month(&query)?;
    let items = requests.get_processed_between(from, to).await?;
    let workbook = report::render_processed_requests(&items).map_err(AppError::from)?;

    tracing::info!(%month, rows = items.len(), user_id = auth.user_id, "Exported processed requests");

    Ok(HttpResponse::Ok()
        .content_type(report::XLSX_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", report::export_filename(&month)),
        ))
        .body(workbook))
}
