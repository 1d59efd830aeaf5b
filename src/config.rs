//! Runtime configuration.
//!
//! All settings come from the environment (optionally via a `.env` file).
//! The struct is built once at startup and handed to the components that
//! need it; nothing reads the environment after that.

use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    pub jwt_secret: String,
    pub database_path: String,
    pub port: u16,
    pub allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            "dev-secret-change-in-production-minimum-32-characters".to_string()
        });

        let database_path = resolve_data_path(env::var("AUTH_DB_PATH").ok(), "authgate.db");

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3005".to_string())
            .parse()
            .unwrap_or(3005);

        let allowed_origin = env::var("CORS_ALLOWED_ORIGIN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            jwt_secret,
            database_path,
            port,
            allowed_origin,
        }
    }
}

/// Resolve a data file path from the environment, defaulting next to the
/// crate rather than the caller's cwd.
fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return base.join(default_filename).to_string_lossy().to_string();
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    base.join(p).to_string_lossy().to_string()
}

/// Load `.env` from the usual search path, plus the crate directory and its
/// parent (common when running with --manifest-path from elsewhere).
pub fn load_env() {
    let _ = dotenv();

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_path_defaults_to_manifest_dir() {
        let resolved = resolve_data_path(None, "authgate.db");
        assert!(resolved.ends_with("authgate.db"));
        assert!(Path::new(&resolved).is_absolute());
    }

    #[test]
    fn test_resolve_data_path_blank_env_value_uses_default() {
        let resolved = resolve_data_path(Some("   ".to_string()), "authgate.db");
        assert!(resolved.ends_with("authgate.db"));
    }

    #[test]
    fn test_resolve_data_path_keeps_absolute_paths() {
        let resolved = resolve_data_path(Some("/var/lib/authgate/users.db".to_string()), "x.db");
        assert_eq!(resolved, "/var/lib/authgate/users.db");
    }

    #[test]
    fn test_resolve_data_path_anchors_relative_paths() {
        let resolved = resolve_data_path(Some("data/users.db".to_string()), "x.db");
        assert!(Path::new(&resolved).is_absolute());
        assert!(resolved.ends_with("data/users.db"));
    }
}
