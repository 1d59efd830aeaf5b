//! Authgate - Minimal JWT Authentication Backend
//! Mission: Register users, authenticate credentials, validate bearer tokens

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authgate_backend::{
    auth::{auth_router, AuthState, JwtHandler, UserStore},
    config::{self, Config},
    middleware::request_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    config::load_env();
    init_tracing();

    let config = Config::from_env();

    info!("🚀 Authgate starting");
    info!("💾 User database: {}", config.database_path);

    let user_store =
        Arc::new(UserStore::new(&config.database_path).context("Failed to open user store")?);
    let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret.clone()));
    let state = AuthState::new(user_store, jwt_handler);

    let app = auth_router(state)
        .layer(middleware::from_fn(request_logging))
        .layer(build_cors(config.allowed_origin.as_deref()));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authgate=debug,authgate_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Restrict cross-origin access to the configured browser origin, with
/// credentials allowed; fall back to permissive CORS when none is set.
fn build_cors(allowed_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = allowed_origin else {
        return CorsLayer::permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => {
            warn!("Ignoring unparseable CORS_ALLOWED_ORIGIN: {}", origin);
            CorsLayer::permissive()
        }
    }
}
