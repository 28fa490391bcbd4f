use std::{env, net::IpAddr, str::FromStr};

use log::info;

use crate::error::ConfigError;

pub const MEMORY_STORE_URL: &str = "memory";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub admin: Option<AdminCredentials>,
}

/// The single shared admin credential: a path secret plus HTTP Basic login.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub secret_key: String,
    pub username: String,
    pub password: String,
}

// Keep secrets out of logs
impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:voting.db".to_string());
        let bind_addr = try_load(&lookup, "BIND_ADDR", "0.0.0.0")?;
        let port = try_load(&lookup, "PORT", "8080")?;

        let admin = match (
            non_empty(&lookup, "ADMIN_SECRET_KEY"),
            non_empty(&lookup, "ADMIN_USER"),
            non_empty(&lookup, "ADMIN_PASS"),
        ) {
            (Some(secret_key), Some(username), Some(password)) => Some(AdminCredentials {
                secret_key,
                username,
                password,
            }),
            _ => {
                info!("Admin credentials not fully set, admin page disabled");
                None
            }
        };

        Ok(Self {
            database_url,
            bind_addr,
            port,
            admin,
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
