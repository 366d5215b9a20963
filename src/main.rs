//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;

use authgate::auth::{Algorithm, AuthService, TokenCodec};
use authgate::config::Config;
use authgate::gateway::HttpIdentityGateway;
use authgate::{create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let algorithm: Algorithm = config
        .jwt_algorithm
        .parse()
        .map_err(|e| anyhow::anyhow!("JWT_ALGORITHM: {:?}", e))?;
    let codec = TokenCodec::new(
        config.jwt_secret.clone(),
        algorithm,
        config.access_token_ttl_minutes,
    );

    let gateway = HttpIdentityGateway::new(
        &config.gateway_url,
        config.gateway_publishable_key.clone(),
        config.gateway_secret_key.clone(),
    )
    .map_err(|e| anyhow::anyhow!("gateway client: {}", e))?;
    let auth_service = AuthService::new(Arc::new(gateway), codec.clone());

    let state = AppState {
        auth_service,
        token_codec: codec,
    };
    let app = create_app(state);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
