use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::{info, warn};

use technoid_api::rate_limit::RateLimitConfig;

pub const SERVICE_NAME: &str = "technoid-backend";

/// Admin secrets that must never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &["christopher", "change-me", "changeme"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub db_readers: usize,
    pub site_dir: PathBuf,
    pub admin_key: Option<String>,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_key = lookup("ADMIN_PASSWORD")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        match admin_key.as_deref() {
            Some(key) if PLACEHOLDER_SECRETS.contains(&key) => {
                bail!("ADMIN_PASSWORD is still a placeholder; set a real secret and restart")
            }
            Some(_) => {}
            None => warn!("ADMIN_PASSWORD not set; the contact listing is disabled"),
        }

        Ok(Self {
            host: load(&lookup, "TECHNOID_HOST", "0.0.0.0")?,
            port: load(&lookup, "PORT", "4000")?,
            db_path: load(&lookup, "TECHNOID_DB_PATH", "technoid.db")?,
            db_readers: load(&lookup, "TECHNOID_DB_READERS", "4")?,
            site_dir: load(&lookup, "TECHNOID_SITE_DIR", "docs")?,
            admin_key,
            rate_limit: RateLimitConfig {
                max_attempts: load_nonzero(&lookup, "TECHNOID_CONTACT_RATE_MAX", "10")?,
                window: Duration::from_secs(load_nonzero(
                    &lookup,
                    "TECHNOID_CONTACT_RATE_WINDOW_SECS",
                    "60",
                )?),
            },
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn load<F, T>(lookup: &F, key: &str, default: &str) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid {key} value '{raw}': {e}"))
}

fn load_nonzero<F, T>(lookup: &F, key: &str, default: &str) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq,
    T::Err: Display,
{
    let value: T = load(lookup, key, default)?;
    if value == T::default() {
        bail!("{key} must be greater than zero");
    }
    Ok(value)
}
