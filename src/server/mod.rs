pub mod routes;

use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::{config::Config, error::Result, stability::StabilityClient};

pub struct AppState {
    pub stability: StabilityClient,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            stability: StabilityClient::new(config.stability.clone())?,
        })
    }
}

/// Register every route on an actix app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        crate::proxy::GENERATE_PATH,
        web::post().to(routes::generate_image),
    )
    .route("/health", web::get().to(routes::health));
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let state = AppState::new(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(state);
    let bind = (config.host.clone(), config.port_or_default());

    log::info!("Listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
