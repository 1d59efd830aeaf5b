//! Authentication Module
//! Mission: Register users, verify credentials, and gate routes with JWT bearer tokens

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use api::{auth_router, AuthState};
pub use jwt::JwtHandler;
pub use middleware::require_auth;
pub use password::PasswordHasher;
pub use user_store::UserStore;
