//! Authentication API Endpoints
//! Mission: Register, login, and token validation routes

use crate::auth::{
    jwt::JwtHandler,
    middleware::{extract_claims, require_auth},
    models::{
        LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, ValidateResponse,
    },
    password::PasswordHasher,
    user_store::{StoreError, UserStore},
};
use axum::{
    extract::{Request, State},
    http::{Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::task;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub password_hasher: PasswordHasher,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
            password_hasher: PasswordHasher::new(),
        }
    }
}

/// Build the application router: public auth routes, the token-gated
/// validate route, and a JSON 404 fallback for everything else.
pub fn auth_router(state: AuthState) -> Router {
    let protected = Router::new()
        .route("/validate", get(validate))
        .route_layer(middleware::from_fn_with_state(
            state.jwt_handler.clone(),
            require_auth,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
        .route("/health", get(health_check))
        .fallback(route_not_found)
        .with_state(state)
}

/// Register endpoint - POST /register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let username = payload.username.unwrap_or_default().trim().to_string();
    let password = payload.password.unwrap_or_default().trim().to_string();
    let mail = payload.mail.unwrap_or_default().trim().to_string();

    if username.is_empty() || password.is_empty() || mail.is_empty() {
        return Err(ApiError::MissingFields);
    }

    // bcrypt is CPU-bound; keep it off the reactor threads
    let hasher = state.password_hasher;
    let password_hash = task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            error!("Hashing task failed: {}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal
        })?;

    match state.user_store.create_user(&username, &password_hash, &mail) {
        Ok(user) => {
            info!("✅ Registered user: {}", user.username);
            Ok((
                StatusCode::CREATED,
                Json(RegisterResponse {
                    message: "User created".to_string(),
                }),
            ))
        }
        // A taken username gets the same generic response as any other
        // store failure; the detail stays in the server log.
        Err(StoreError::Duplicate) => {
            warn!("Registration rejected, username taken: {}", username);
            Err(ApiError::Internal)
        }
        Err(e) => {
            error!("DB error during registration: {}", e);
            Err(ApiError::Internal)
        }
    }
}

/// Login endpoint - POST /login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = payload.username.unwrap_or_default().trim().to_string();
    let password = payload.password.unwrap_or_default().trim().to_string();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::MissingFields);
    }

    // Unknown usernames take the same rejection path as a bad password
    let user = match state.user_store.get_user_by_username(&username) {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("❌ Failed login attempt: {}", username);
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            error!("DB error during login: {}", e);
            return Err(ApiError::Internal);
        }
    };

    let hasher = state.password_hasher;
    let stored_hash = user.password_hash.clone();
    let valid = task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
        .await
        .map_err(|e| {
            error!("Verification task failed: {}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            error!("Password comparison failed: {}", e);
            ApiError::Internal
        })?;

    if !valid {
        warn!("❌ Failed login attempt: {}", username);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .jwt_handler
        .issue(&user.id, &user.username)
        .map_err(|e| {
            error!("Token signing failed: {}", e);
            ApiError::Internal
        })?;

    info!("✅ Login successful: {}", user.username);

    Ok(Json(LoginResponse { auth: true, token }))
}

/// Validate endpoint - GET /validate (behind the auth middleware)
///
/// Reaching this handler means verification already succeeded; it echoes
/// the identity the middleware attached and does no checking of its own.
pub async fn validate(req: Request) -> Result<Json<ValidateResponse>, ApiError> {
    let claims = extract_claims(&req).ok_or(ApiError::Internal)?;

    info!("Token validated for user: {}", claims.username);

    Ok(Json(ValidateResponse {
        username: claims.username.clone(),
    }))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// JSON 404 for unmatched routes
pub async fn route_not_found(method: Method, uri: Uri) -> Response {
    info!(method = %method, path = %uri.path(), "Route not found");

    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
        .into_response()
}

/// Auth API errors
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    MissingFields,
    InvalidCredentials,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing required fields"),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
