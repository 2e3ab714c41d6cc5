use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite:finance.db";

/// Runtime configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
}

impl Config {
    /// Read configuration from environment variables.
    ///
    /// `PORT` and `DATABASE_URL` fall back to defaults; `JWT_SECRET` is
    /// required since tokens signed with a guessable secret are worthless.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {raw}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Self {
            port,
            database_url,
            jwt_secret,
        })
    }
}
