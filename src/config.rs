use serde::Deserialize;
use std::env;

use crate::error::Error;

/// Process-wide configuration, loaded once at startup. The SMTP block is
/// handed to the transport at construction time; nothing reads it afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address placed on every outgoing message.
    pub from: String,
    /// "starttls" (default), "tls", or "none".
    pub tls: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://campaign_hub.db".into());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

        let host = require("SMTP_HOST")?;
        let port = env::var("SMTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(587);
        let username = env::var("SMTP_USERNAME").ok();
        let password = env::var("SMTP_PASSWORD").ok();
        let from = require("SMTP_FROM")?;
        let tls = env::var("SMTP_TLS").unwrap_or_else(|_| "starttls".into());

        Ok(Config {
            database_url,
            bind_addr,
            smtp: SmtpConfig {
                host,
                port,
                username,
                password,
                from,
                tls,
            },
        })
    }
}

fn require(key: &str) -> Result<String, Error> {
    env::var(key).map_err(|_| Error::Config(format!("{key} must be set")))
}
