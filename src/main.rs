use artwork_gnfd::{logger, server, Config};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!(".env file loaded");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.host,
        config.port_or_default(),
    );
    logger::log_config_info(&config);

    if config.stability.api_key.is_none() {
        log::error!("STABILITY_API_KEY is not set; every generation request will fail");
    }

    server::run(config).await?;
    Ok(())
}
