use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use bookstore_api::config::ApiConfig;
use bookstore_api::infra::blob::LocalBlobStore;
use bookstore_api::infra::credentials::Argon2Credentials;
use bookstore_api::router::build_router;
use bookstore_api::state::AppState;
use bookstore_auth_types::identity::TokenSecret;
use bookstore_core::tracing::{LogFormat, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::Json);

    let config = ApiConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let state = AppState {
        db,
        jwt_secret: TokenSecret::new(config.jwt_secret),
        cookie_domain: config.cookie_domain,
        blobs: LocalBlobStore::new(config.media_root, config.media_url),
        credentials: Argon2Credentials,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
