use anyhow::{Context, ensure};
use dotenvy::dotenv;
use std::{env, fmt::Display, str::FromStr};

use crate::service::attendance::DEFAULT_CHECKIN_CUTOFF_HOUR;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173,http://localhost:4173,http://127.0.0.1:4173";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub cookie_secure: bool,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub cors_allowed_origins: Vec<String>,

    /// First UTC hour at which a check-in is late.
    pub checkin_cutoff_hour: u32,
    pub log_dir: String,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

/// Splits a comma separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let config = Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed_or("ACCESS_TOKEN_TTL", 86_400)?, // default 24 h
            cookie_secure: parsed_or("COOKIE_SECURE", false)?,

            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),

            checkin_cutoff_hour: parsed_or("CHECKIN_CUTOFF_HOUR", DEFAULT_CHECKIN_CUTOFF_HOUR)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        ensure!(config.checkin_cutoff_hour < 24, "CHECKIN_CUTOFF_HOUR must be between 0 and 23");
        ensure!(!config.jwt_secret.is_empty(), "JWT_SECRET must not be empty");

        Ok(config)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://localhost/hr_portal_test".into(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 3600,
            cookie_secure: false,
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            cors_allowed_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            checkin_cutoff_hour: DEFAULT_CHECKIN_CUTOFF_HOUR,
            log_dir: "logs".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn origins_are_trimmed() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(Config::for_tests().cors_allowed_origins.len(), 4);
    }
}
