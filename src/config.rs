use std::{env, str::FromStr};

use anyhow::Context;
use dotenvy::dotenv;
use tracing::warn;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// MySQL connection string; the store runs in memory without one.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,
    pub admin_pin: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_kiosk_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Assistant
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Unparseable setting, using default");
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: optional("DATABASE_URL"),
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed_or("ACCESS_TOKEN_TTL", 900), // 15 min
            refresh_token_ttl: parsed_or("REFRESH_TOKEN_TTL", 43_200), // one shift
            admin_pin: optional("ADMIN_PIN").unwrap_or_else(|| "0000".to_string()),

            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 10),
            rate_refresh_per_min: parsed_or("RATE_REFRESH_PER_MIN", 30),
            rate_kiosk_per_min: parsed_or("RATE_KIOSK_PER_MIN", 240),
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000),

            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_model: optional("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            gemini_endpoint: optional("GEMINI_ENDPOINT").unwrap_or_else(|| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
        })
    }
}
