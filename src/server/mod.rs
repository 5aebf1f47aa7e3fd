pub mod handlers;

use crate::{
    config::Config,
    error::{GenError, Result},
    replicate::GenerationClient,
};
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub client: Arc<dyn GenerationClient>,
}

impl AppState {
    pub fn new(config: Config, client: Arc<dyn GenerationClient>) -> Self {
        Self { config, client }
    }
}

/// Registers every route. Each resource only accepts its listed method and
/// answers anything else with 405.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/generate").route(web::post().to(handlers::generate)))
        .service(web::resource("/api/portrait").route(web::post().to(handlers::portrait)))
        .service(web::resource("/api/avatar/generate").route(web::post().to(handlers::avatar)))
        .service(web::resource("/api/polish").route(web::post().to(handlers::polish)))
        .service(web::resource("/api/chat").route(web::post().to(handlers::chat)))
        .service(web::resource("/api/health").route(web::get().to(handlers::health)));
}

/// JSON extractor settings: body size limit and `{error, detail}` on bad bodies.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| GenError::InvalidInput(err.to_string()).into())
}

/// Any origin may call the API; the browser front end is served separately.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub async fn run(state: AppState) -> Result<()> {
    let bind_address = state.config.bind_address();
    let body_limit = state.config.max_body_bytes;
    let data = web::Data::new(state);

    log::info!("Listening on http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(json_config(body_limit))
            .wrap(cors())
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .configure(configure)
    })
    .bind(&bind_address)
    .map_err(|e| GenError::ConfigError(format!("Failed to bind {}: {}", bind_address, e)))?
    .run()
    .await
    .map_err(|e| GenError::ConfigError(format!("Server error: {}", e)))
}
