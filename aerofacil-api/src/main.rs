use aerofacil_api::{app, AppState, AuthConfig};
use aerofacil_store::app_config::{Config, StorageBackend};
use aerofacil_store::{DbClient, MemoryStore};
use anyhow::Context;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aerofacil_api=debug,aerofacil_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting AeroFácil on port {}", config.server.port);

    let repos = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = DbClient::new(&config.database.url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            db.repositories()
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            MemoryStore::new().repositories()
        }
    };

    let app_state = AppState::new(
        repos,
        config.listings,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            secure_cookies: config.auth.secure_cookies,
        },
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
