use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

/// Longest session a token may be issued for, in days.
const MAX_SESSION_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub session_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("ALMASRIF_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("ALMASRIF_JWT_SECRET is unset or still a placeholder");
        }

        let db_path = lookup("ALMASRIF_DB_PATH").unwrap_or_else(|| "almasrif.db".into());
        let host = lookup("ALMASRIF_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("ALMASRIF_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("ALMASRIF_PORT is not a valid port")?;
        let session_days: i64 = lookup("ALMASRIF_SESSION_DAYS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .context("ALMASRIF_SESSION_DAYS is not a number")?;
        if !(1..=MAX_SESSION_DAYS).contains(&session_days) {
            bail!("ALMASRIF_SESSION_DAYS must be between 1 and {}", MAX_SESSION_DAYS);
        }
        let session_ttl = chrono::Duration::try_days(session_days)
            .context("ALMASRIF_SESSION_DAYS is out of range")?;

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            db_path: db_path.into(),
            addr,
            session_ttl,
        })
    }
}
