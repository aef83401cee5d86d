use std::sync::Arc;

use dotenvy::dotenv;
use log::info;

use leatherserver::api_router::configure_api_routes;
use leatherserver::config::AppConfig;
use leatherserver::media::HttpImageStore;
use leatherserver::payments::MockTransferProvider;
use leatherserver::shared::state::AppState;
use leatherserver::shared::utils::{create_conn, run_migrations};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()?;
    let pool = create_conn()?;
    run_migrations(&pool)?;

    let state = Arc::new(AppState {
        conn: pool,
        images: Arc::new(HttpImageStore::new(config.media.clone())),
        payments: Arc::new(MockTransferProvider::default()),
        config: config.clone(),
    });

    let app = configure_api_routes()
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("leatherserver listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
