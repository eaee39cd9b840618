use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tracing::warn;

use crate::security::password::DEFAULT_COST;

/// Account seeded with the admin role at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapAdmin {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_password_cost")]
    pub password_cost: u32,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

fn default_jwt_expiration() -> String {
    "1h".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_password_cost() -> u32 {
    DEFAULT_COST
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiration: default_jwt_expiration(),
            port: default_port(),
            password_cost: default_password_cost(),
            bootstrap_admin: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).context("reading config file")?;
        let cfg: Config = serde_json::from_str(&raw).context("parsing JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// File (when given) or defaults, then environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from `JWT_SECRET`, `JWT_EXPIRATION`, `PORT` and `PASSWORD_COST`.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.jwt_secret = Some(secret);
        }
        if let Some(exp) = lookup("JWT_EXPIRATION") {
            self.jwt_expiration = exp;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse().context("parsing PORT")?;
        }
        if let Some(cost) = lookup("PASSWORD_COST") {
            self.password_cost = cost.trim().parse().context("parsing PASSWORD_COST")?;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        self.token_ttl()?;
        if !(4..=31).contains(&self.password_cost) {
            bail!("password_cost must be between 4 and 31, got {}", self.password_cost);
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Result<Duration> {
        parse_duration(&self.jwt_expiration)
    }

    /// Configured signing secret, or a random one that only lives as long as the process.
    pub fn signing_secret(&self) -> Vec<u8> {
        match &self.jwt_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                warn!("jwt_secret not configured; generated an ephemeral signing secret");
                let mut bytes = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut bytes);
                general_purpose::STANDARD.encode(bytes).into_bytes()
            }
        }
    }
}

/// Parse `3600`, `45s`, `15m`, `1h` or `7d`.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits
        .parse()
        .with_context(|| format!("invalid duration '{raw}'"))?;
    let multiplier: u64 = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        other => bail!("unknown duration unit '{other}' in '{raw}'"),
    };
    let Some(secs) = value.checked_mul(multiplier) else {
        bail!("duration '{raw}' is too large");
    };
    if secs == 0 {
        bail!("duration '{raw}' must be positive");
    }
    Ok(Duration::from_secs(secs))
}
