use anyhow::Context;
use serde::Deserialize;

/// Ten years.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 366 * 10;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub cookie_name: String,
    pub ttl_minutes: i64,
}

/// Switches for the two legacy behaviours that are off by default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    /// Accept a login request that carries no password at all.
    pub allow_missing_password: bool,
    /// Require recipe instructions of at least 50 characters.
    pub enforce_instructions: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
    pub policy: PolicyConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://recipe_box.db".into());
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = match lookup("APP_PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("APP_PORT={v}"))?,
            None => 5555,
        };

        let session = SessionConfig {
            secret: lookup("SESSION_SECRET").context("SESSION_SECRET must be set")?,
            issuer: lookup("SESSION_ISSUER").unwrap_or_else(|| "recipe-box".into()),
            cookie_name: lookup("SESSION_COOKIE_NAME").unwrap_or_else(|| "session".into()),
            ttl_minutes: match lookup("SESSION_TTL_MINUTES") {
                Some(v) => v
                    .parse::<i64>()
                    .with_context(|| format!("SESSION_TTL_MINUTES={v}"))?,
                None => 60 * 24 * 31,
            },
        };
        anyhow::ensure!(!session.secret.is_empty(), "SESSION_SECRET must not be empty");
        anyhow::ensure!(
            (1..=MAX_SESSION_TTL_MINUTES).contains(&session.ttl_minutes),
            "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}"
        );

        let policy = PolicyConfig {
            allow_missing_password: flag(&lookup, "LOGIN_ALLOW_MISSING_PASSWORD")?,
            enforce_instructions: flag(&lookup, "RECIPE_ENFORCE_INSTRUCTIONS")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            session,
            policy,
        })
    }
}

fn flag<F>(lookup: &F, key: &str) -> anyhow::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{key}: expected a boolean, got {other:?}"),
    }
}
