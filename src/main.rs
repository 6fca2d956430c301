mod config;
mod model;
mod prompt;
mod web;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files as fs;
use actix_web::middleware::Logger;
use actix_web::web::{Data, PayloadConfig};
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{error, info};

use config::RelayConfig;
use model::{GeminiModel, Generator};
use prompt::PromptSettings;
use web::routes;

// App state structure, immutable once the server starts
pub struct AppState {
    pub generator: Arc<dyn Generator>,
    pub prompt: PromptSettings,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Refuse to bind anything without a credential
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Starting Gemini relay: {:?}", config);

    let generator: Arc<dyn Generator> = Arc::new(GeminiModel::new(&config));
    let app_state = Data::new(AppState {
        generator,
        prompt: PromptSettings::default(),
    });

    let static_dir = config.static_dir.clone();
    let max_body_bytes = config.max_body_bytes;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .app_data(PayloadConfig::new(max_body_bytes))
            .configure(routes::configure)
            .service(fs::Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;

    info!("Server running: http://localhost:{}", config.port);
    server.run().await.context("server terminated with an error")?;
    Ok(())
}
