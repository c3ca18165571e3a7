use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

use crate::access::AccessMode;

pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub table_name: String,
    pub sender_email: String,
    pub email_endpoint: String,
    pub email_api_key: String,
    pub access_mode: AccessMode,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "1111"),
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379"),
            table_name: require("TABLE_NAME"),
            sender_email: require("SENDER_EMAIL"),
            email_endpoint: require("EMAIL_ENDPOINT"),
            email_api_key: read_secret("EMAIL_API_KEY"),
            access_mode: try_load("ACCESS_MODE", "open"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn require(key: &str) -> String {
    var(key).expect("Environment misconfigured!")
}

fn read_secret(secret_name: &str) -> String {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .expect("Secrets misconfigured!")
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        port: 0,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        table_name: "design-details".to_string(),
        sender_email: "studio@example.com".to_string(),
        email_endpoint: "http://127.0.0.1:9/send".to_string(),
        email_api_key: "test-key".to_string(),
        access_mode: AccessMode::Open,
    }
}
