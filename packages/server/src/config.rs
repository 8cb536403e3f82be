use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;

use crate::domains::notifications::FanOutMode;
use crate::kernel::DEFAULT_STRIKE_THRESHOLD;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Empty means permissive CORS.
    pub allowed_origins: Vec<String>,
    /// Base URL of the external search indexer. `None` disables indexing.
    pub search_index_url: Option<String>,
    pub strike_threshold: i32,
    pub fanout_mode: FanOutMode,
    /// Prometheus listener address.
    pub metrics_addr: Option<SocketAddr>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "agora".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            search_index_url: env::var("SEARCH_INDEX_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            strike_threshold: match env::var("STRIKE_THRESHOLD") {
                Ok(v) => v
                    .parse()
                    .context("STRIKE_THRESHOLD must be a valid number")?,
                Err(_) => DEFAULT_STRIKE_THRESHOLD,
            },
            fanout_mode: match env::var("FANOUT_MODE") {
                Ok(v) => v.parse().context("FANOUT_MODE must be inline or background")?,
                Err(_) => FanOutMode::Background,
            },
            metrics_addr: env::var("METRICS_ADDR")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .context("METRICS_ADDR must be a socket address")?,
        })
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        assert_eq!(
            parse_list(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
