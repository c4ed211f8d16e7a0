use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;
use futures::lock::Mutex;
use std::sync::Arc;

mod api;
mod assistant;
mod auth;
mod config;
mod db;
mod docs;
mod kiosk;
mod model;
mod models;
mod report;
mod routes;
mod store;
mod sync;
mod utils;

use crate::assistant::{AssistantRelay, gemini::GeminiClient};
use crate::auth::gate::PinGate;
use crate::docs::ApiDoc;
use crate::kiosk::{KioskHandle, camera::BrowserCamera, session::PunchSession};
use crate::routes::Limiters;
use crate::store::{
    RecordStore,
    backend::{MemoryBackend, MySqlBackend, StorageBackend},
};
use crate::sync::webhook::WebhookForwarder;
use config::Config;
use db::init_db;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Rolling daily log
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let file_appender = rolling::daily(&log_dir, "app.log");
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

    let config = Config::from_env()?;

    let backend: Arc<dyn StorageBackend> = match &config.database_url {
        Some(url) => Arc::new(MySqlBackend::new(init_db(url).await?)),
        None => {
            warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryBackend::new())
        }
    };

    let http = reqwest::Client::new();
    let store = Arc::new(RecordStore::new(
        backend,
        Arc::new(WebhookForwarder::new(http.clone())),
    ));

    let gate = Arc::new(PinGate::from_pin(&config.admin_pin)?);
    let kiosk: Data<KioskHandle> = Data::new(Mutex::new(PunchSession::new(
        store.clone(),
        gate,
        BrowserCamera::new(),
    )));

    let gemini = GeminiClient::new(
        http,
        config.gemini_api_key.clone(),
        &config.gemini_endpoint,
        &config.gemini_model,
    );
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set, the assistant will only answer with a fallback");
    }
    let relay = Data::new(AssistantRelay::new(Arc::new(gemini)));

    let limiters = Limiters::from_config(&config)?;
    let store = Data::from(store);
    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, api_prefix = %config.api_prefix, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(kiosk.clone())
            .app_data(relay.clone())
            .app_data(Data::new(config.clone()))
            // kiosk + auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config, limiters.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
