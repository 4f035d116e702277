use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod report;
mod routes;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::report::job::DailyReportJob;
use crate::report::notifier::PushNotifier;
use crate::report::policy::CutoffPolicy;
use crate::report::store::MySqlReportStore;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance report service"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
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

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    info!("Server starting...");

    if config.cron_secret.is_none() {
        warn!("CRON_SECRET is not set, the daily report trigger accepts any caller");
    }
    if config.push_api_token.is_none() {
        warn!("PUSH_API_TOKEN is not set, daily reports will fail with a configuration error");
    }

    let pool = init_db(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("{e:#}")))?;

    let notifier = PushNotifier::new(
        config.push_api_url.clone(),
        config.push_api_token.clone(),
        Duration::from_secs(config.push_timeout_secs),
    )
    .map_err(std::io::Error::other)?;

    let job = Data::new(DailyReportJob::new(
        Arc::new(MySqlReportStore::new(pool.clone())),
        Arc::new(notifier),
        CutoffPolicy::new(config.late_cutoff),
    ));

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(job.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
