use anyhow::{bail, Result};
use std::env;

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Server-level settings: bind address, signing secret and the directory
/// the backup job writes dumps into.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub backup_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let environment = env_or("ENVIRONMENT", "development");

        // A fallback secret is fine for local runs but never in production.
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == "production" => {
                bail!("JWT_SECRET must be set when ENVIRONMENT=production")
            }
            Err(_) => "dev-only-insecure-secret".to_string(),
        };

        Ok(AppConfig {
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "3000").parse().unwrap_or(3000),
            environment,
            jwt_secret,
            backup_dir: env_or("BACKUP_DIR", "./backups"),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
