use crate::{
    auth::{jwt::generate_access_token, middleware::ACCESS_TOKEN_COOKIE, password::verify_password},
    config::Config,
    error::AppError,
    models::{LoginReqDto, LoginResponse},
    store::UserDirectory,
};
use actix_web::{
    HttpResponse, Responder,
    cookie::{Cookie, SameSite, time::Duration},
    web,
};
use tracing::{debug, info, instrument};

fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(config.access_token_ttl as i64))
        .finish()
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = LoginReqDto, content_type = "application/json"),
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = Object, example = json!({
            "error": "email and password required"
        })),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "invalid credentials"
        })),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(users, config, payload))]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    users: web::Data<UserDirectory>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("email and password required").into());
    }

    debug!(%email, "Fetching user from directory");

    let invalid = || AppError::Unauthorized("invalid credentials".into());
    let Some(user) = users.find_by_email(&email).await? else {
        info!(%email, "Invalid credentials: user not found");
        return Err(invalid().into());
    };

    if let Err(e) = verify_password(&payload.password, &user.password_hash) {
        info!(user_id = user.id, error = %e, "Invalid credentials: password mismatch");
        return Err(invalid().into());
    }

    let token = generate_access_token(
        user.id,
        user.roles.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    )?;

    info!(user_id = user.id, "Login successful");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, &config))
        .json(LoginResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            roles: user.roles,
        }))
}

/// Logout endpoint; clears the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Session cookie cleared")),
    tag = "Auth"
)]
pub async fn logout() -> impl Responder {
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::NoContent().cookie(cookie).finish()
}
