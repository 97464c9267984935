use anyhow::{Context, Result};
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::str::FromStr;

/// Toggles for the hardened variant. Both are off by default, which keeps the
/// open behaviour: any valid token may touch any record and deleting a user
/// leaves their tasks to the store's foreign key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Delete a user's tasks together with the user.
    pub cascade_user_delete: bool,
    /// Embed the user id in issued tokens and narrow task access to the caller.
    pub enforce_task_ownership: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL. Takes precedence over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).context("DATABASE_URL is not a valid URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    /// Signing secret. A missing secret is not fatal at startup; issuing and
    /// verifying tokens fails instead.
    pub secret_key: Option<String>,
    pub policy: AccessPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the
    /// process environment.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server_host: text("SERVER_HOST", "127.0.0.1"),
            server_port: parse_or(&lookup, "SERVER_PORT", 3000)?,
            database: DatabaseConfig {
                url: lookup("DATABASE_URL"),
                host: text("DB_HOST", "localhost"),
                port: parse_or(&lookup, "DB_PORT", 5432)?,
                name: text("DB_NAME", "bdagenda"),
                user: text("DB_USER", "root"),
                password: text("DB_PASSWORD", ""),
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            },
            secret_key: lookup("SECRET_KEY"),
            policy: AccessPolicy {
                cascade_user_delete: parse_or(&lookup, "CASCADE_USER_DELETE", false)?,
                enforce_task_ownership: parse_or(&lookup, "ENFORCE_TASK_OWNERSHIP", false)?,
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
