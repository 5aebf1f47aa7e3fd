use imagerelay::{logger, server, AppState, Config, ReplicateClient};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env.local wins over .env; neither is required.
    let local_env = dotenv::from_filename(".env.local").is_ok();
    let default_env = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    match (local_env, default_env) {
        (true, _) => log::info!(".env.local loaded"),
        (false, true) => log::info!(".env loaded"),
        (false, false) => log::warn!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.bind_address(),
    );
    logger::log_config_info(&config);

    let client = match ReplicateClient::new(config.replicate.clone()) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to initialize provider client: {}", e);
            return Err(e.into());
        }
    };

    server::run(AppState::new(config, Arc::new(client))).await?;
    Ok(())
}
