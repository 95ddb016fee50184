use std::net::SocketAddr;

use anyhow::{Context, Result};
use crm::AuthConfig;
use platform_db::DatabaseSettings;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEV_SECRET: &str = "dev-secret";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub bind: SocketAddr,
    pub auth: AuthConfig,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseSettings::from_env()?;
        let bind = std::env::var("BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.into())
            .parse()
            .context("invalid BIND address")?;

        let jwt_secret = std::env::var("AUTH_SECRET").unwrap_or_else(|_| DEV_SECRET.into());
        let session_ttl_minutes = match std::env::var("SESSION_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid SESSION_TTL_MINUTES: {raw}"))?,
            Err(_) => 60,
        };

        Ok(Self {
            database,
            bind,
            auth: AuthConfig {
                jwt_secret,
                session_ttl_minutes,
            },
            cors_allowed_origins: parse_origins(
                &std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_skip_blank_entries() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }
}
