use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
#[cfg(test)]
mod test_utils;
mod utils;

use config::Config;
use db::{ensure_schema, init_db};

use crate::docs::ApiDoc;
use crate::routes::Limiters;
use crate::service::{AttendanceService, RequestService};
use crate::store::{MySqlAttendanceStore, MySqlRequestStore, UserDirectory};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

fn build_cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
        .expose_headers(vec!["Content-Disposition"])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("failed to connect to database")?;
    ensure_schema(&pool)
        .await
        .context("failed to prepare database schema")?;

    let attendance = Data::new(AttendanceService::new(
        MySqlAttendanceStore::new(pool.clone()),
        config.checkin_cutoff_hour,
    ));
    let requests = Data::new(RequestService::new(MySqlRequestStore::new(pool.clone())));
    let users = Data::new(UserDirectory::new(pool));
    let config_data = Data::new(config.clone());
    let limiters = Limiters::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    info!(%server_addr, cutoff_hour = config.checkin_cutoff_hour, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&config.cors_allowed_origins))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(attendance.clone())
            .app_data(requests.clone())
            .app_data(users.clone())
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| {
                routes::configure::<MySqlRequestStore, MySqlAttendanceStore>(cfg, &config, &limiters)
            })
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
