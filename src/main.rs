mod config;
mod db;
mod models;
mod responses;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use http::{header::HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use db::pg_store::PgStore;
use services::auth_client::EmergentAuthClient;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = Config::from_env();

    let store = PgStore::connect(&cfg.database_url).await?;
    let auth = EmergentAuthClient::new(cfg.auth_session_data_url.clone());

    let cors = CorsLayer::new()
        .allow_origin([HeaderValue::from_str(&cfg.frontend_origin)?])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any);

    let port = cfg.port;
    let state = AppState {
        db: Arc::new(store),
        auth: Arc::new(auth),
        config: Arc::new(cfg),
    };

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
