use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Reset-token signing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_seconds: i64,
}

impl ResetConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "gatehouse".into(),
            audience: "password-reset".into(),
            ttl_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    pub database_url: String,
    pub reset: ResetConfig,
    /// Prefix for generated reset links, e.g. `https://example.com/`.
    pub public_base_url: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AccountsConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://users.db".into());
        let secret = std::env::var("RESET_SECRET").context("RESET_SECRET must be set")?;
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| with_trailing_slash(v.trim()));
        Ok(Self {
            database_url,
            reset: ResetConfig::with_secret(secret),
            public_base_url,
            host: host_from_env(),
            port: port_from_env(8080)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    pub api_key: Option<String>,
    pub sheet_path: String,
    pub nmap_path: String,
    pub scan_timeout_secs: u64,
    pub host: String,
    pub port: u16,
}

impl SheetsConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("API_KEY").ok().filter(|v| !v.is_empty());
        let scan_timeout_secs = std::env::var("SCAN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(180);
        Ok(Self {
            api_key,
            sheet_path: std::env::var("SHEET_PATH").unwrap_or_else(|_| "user.xlsx".into()),
            nmap_path: std::env::var("NMAP_PATH").unwrap_or_else(|_| "nmap".into()),
            scan_timeout_secs,
            host: host_from_env(),
            port: port_from_env(5000)?,
        })
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}

fn host_from_env() -> String {
    std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into())
}

fn port_from_env(default: u16) -> anyhow::Result<u16> {
    match std::env::var("PORT") {
        Ok(v) => v.parse::<u16>().with_context(|| format!("invalid PORT {v:?}")),
        Err(_) => Ok(default),
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
