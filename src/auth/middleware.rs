use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpRequest, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    web::Data,
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Session token from the `access_token` cookie, or a Bearer header as fallback.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| AppError::Internal("App config missing".into()))?;

    let Some(token) = session_token(req.request()) else {
        let resp = AppError::Unauthorized("missing token".into()).error_response();
        return Ok(req.into_response(resp));
    };

    let claims = match verify_token(&token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(path = %req.path(), "Rejected session token");
            return Ok(req.into_response(e.error_response()));
        }
    };

    req.extensions_mut().insert(AuthUser::from_claims(&claims));

    next.call(req).await
}
