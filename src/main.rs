use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};

use agenda::auth::AuthMiddleware;
use agenda::config::{AccessPolicy, Config};
use agenda::routes;
use agenda::state::AppState;
use agenda::store::PgStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()?;
    if config.secret_key.is_none() {
        warn!("SECRET_KEY is not set: token issuance will fail and every token will be rejected");
    }
    if config.policy != AccessPolicy::default() {
        info!("Access policy: {:?}", config.policy);
    }

    let store = PgStore::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    store.migrate().await.context("Failed to run migrations")?;

    let state = web::Data::new(AppState::from_config(Arc::new(store), &config));

    info!("App listening at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(AuthMiddleware)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    Ok(())
}
