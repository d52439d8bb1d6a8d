use crate::{
    api::{attendance, request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
    store::{AttendanceStore, RequestStore},
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP rate limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    login: Arc<Limiter>,
    protected: Arc<Limiter>,
}

impl Limiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min)?),
            protected: Arc::new(build_limiter(config.rate_protected_per_min)?),
        })
    }
}

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min}/min"))?;
    Ok(Governor::new(&cfg))
}

// Extractor failures answer 400 with the same JSON shape as handler errors
fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(|err, _| {
        AppError::validation(format!("invalid id: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        AppError::validation(format!("invalid query: {err}")).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _| {
        AppError::validation(format!("invalid request body: {err}")).into()
    }));
}

/// Mounts the public auth scope and the protected API, served by engines over `R` and `A`.
pub fn configure<R, A>(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters)
where
    R: RequestStore + 'static,
    A: AttendanceStore + 'static,
{
    extractor_errors(cfg);

    // Public routes; registered before the protected scope so the prefix does not shadow them
    cfg.service(
        web::scope(&format!("{}/auth", config.api_prefix))
            .service(
                web::resource("/login")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/logout")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .service(
                web::scope("/requests")
                    // /requests
                    .service(web::resource("").route(web::post().to(request::create_request::<R>)))
                    .service(web::resource("/my").route(web::get().to(request::my_requests::<R>)))
                    .service(
                        web::resource("/approvals").route(web::get().to(request::pending_requests::<R>)),
                    )
                    // /requests/summary
                    .service(web::resource("/summary").route(web::get().to(request::summary::<R>)))
                    .service(web::resource("/summary/my").route(web::get().to(request::my_summary::<R>)))
                    // /requests/processed
                    .service(web::resource("/processed").route(web::get().to(request::processed::<R>)))
                    .service(
                        web::resource("/processed/export")
                            .route(web::get().to(request::export_processed::<R>)),
                    )
                    // /requests/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::post().to(request::approve_request::<R>)),
                    )
                    // /requests/{id}/reject
                    .service(
                        web::resource("/{id}/reject").route(web::post().to(request::reject_request::<R>)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(web::resource("/checkin").route(web::post().to(attendance::check_in::<A>)))
                    .service(web::resource("/checkout").route(web::post().to(attendance::check_out::<A>)))
                    .service(web::resource("/summary").route(web::get().to(attendance::summary::<A>)))
                    .service(web::resource("/list").route(web::get().to(attendance::list::<A>))),
            ),
    );
}
