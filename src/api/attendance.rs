use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::service::AttendanceService;
use crate::store::AttendanceStore;
use crate::utils::clock;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// Inclusive start, `YYYY-MM-DD`
    #[param(example = "2024-06-01")]
    pub from: Option<String>,
    /// Exclusive end, `YYYY-MM-DD`
    #[param(example = "2024-07-01")]
    pub to: Option<String>,
}

/// Resolves the `[from, to)` query; when either side is missing the current month is used.
fn resolve_range(
    query: &DateRangeQuery,
    now: DateTime<Utc>,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    match (query.from.as_deref(), query.to.as_deref()) {
        (Some(from), Some(to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            let from = clock::parse_date(from)
                .ok_or_else(|| AppError::validation("invalid from date (YYYY-MM-DD)"))?;
            let to = clock::parse_date(to)
                .ok_or_else(|| AppError::validation("invalid to date (YYYY-MM-DD)"))?;
            Ok((from, to))
        }
        _ => clock::month_bounds(clock::today(now))
            .ok_or_else(|| AppError::Internal("current month out of range".into())),
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    responses(
        (status = 200, description = "Today's record after check-in", body = crate::model::attendance::AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("cookie_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in<S: AttendanceStore + 'static>(
    auth: AuthUser,
    attendance: web::Data<AttendanceService<S>>,
) -> actix_web::Result<impl Responder> {
    let record = attendance.checkin(auth.user_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    responses(
        (status = 200, description = "Today's record after check-out", body = crate::model::attendance::AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("cookie_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out<S: AttendanceStore + 'static>(
    auth: AuthUser,
    attendance: web::Data<AttendanceService<S>>,
) -> actix_web::Result<impl Responder> {
    let record = attendance.checkout(auth.user_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Attendance totals for the caller
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Attendance summary", body = crate::model::attendance::AttendanceSummary),
        (status = 400, description = "Malformed date", body = Object, example = json!({
            "error": "invalid from date (YYYY-MM-DD)"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("cookie_auth" = [])),
    tag = "Attendance"
)]
pub async fn summary<S: AttendanceStore + 'static>(
    auth: AuthUser,
    attendance: web::Data<AttendanceService<S>>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    let (from, to) = resolve_range(&query, Utc::now())?;
    let summary = attendance.summary(auth.user_id, from, to).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Stored attendance records for the caller
#[utoipa::path(
    get,
    path = "/api/attendance/list",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Records ordered by date", body = [crate::model::attendance::AttendanceRecord]),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized")
    ),
    security(("cookie_auth" = [])),
    tag = "Attendance"
)]
pub async fn list<S: AttendanceStore + 'static>(
    auth: AuthUser,
    attendance: web::Data<AttendanceService<S>>,
    query: web::Query<DateRangeQuery>,
) -> actix_web::Result<impl Responder> {
    let (from, to) = resolve_range(&query, Utc::now())?;
    let records = attendance.list(auth.user_id, from, to).await?;

    Ok(HttpResponse::Ok().json(records))
}
