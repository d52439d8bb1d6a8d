use crate::api::request::{CreateRequest, RejectRequest};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary};
use crate::model::request::{Request, RequestStatus, RequestSummary, RequestType};
use crate::models::{LoginReqDto, LoginResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Portal API",
        version = "1.0.0",
        description = r#"
## HR Portal

Backend for an employee self-service portal.

### 🔹 Key Features
- **Requests**
  - Submit leave and overtime requests, approve or reject them, monthly summaries
  - Export the month's processed requests as a spreadsheet
- **Attendance**
  - Daily check-in and check-out with on-time / late classification
  - Working-day based absence summaries

### 🔐 Security
Endpoints outside `/api/auth` require the `access_token` session cookie set by login.
Only **ADMIN**, **HR** and **MANAGER** roles can decide requests or view system-wide reports.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::request::create_request,
        crate::api::request::my_requests,
        crate::api::request::pending_requests,
        crate::api::request::approve_request,
        crate::api::request::reject_request,
        crate::api::request::summary,
        crate::api::request::my_summary,
        crate::api::request::processed,
        crate::api::request::export_processed,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::summary,
        crate::api::attendance::list
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            CreateRequest,
            RejectRequest,
            Request,
            RequestType,
            RequestStatus,
            RequestSummary,
            AttendanceRecord,
            AttendanceStatus,
            AttendanceSummary
        )
    ),
    modifiers(&SessionCookie),
    tags(
        (name = "Auth", description = "Session login and logout"),
        (name = "Requests", description = "Leave and overtime request APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
    )
)]
pub struct ApiDoc;

struct SessionCookie;

impl Modify for SessionCookie {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("access_token"))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/auth/login",
            "/api/requests",
            "/api/requests/{id}/approve",
            "/api/requests/processed/export",
            "/api/attendance/list",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("cookie_auth"))
        );
    }
}
