// src/config.rs
//! Process configuration from environment variables (`.env` honored in dev).
//! Keyword/threshold configuration is separate; see `crate::gate`.

use anyhow::{bail, Context, Result};

// --- env names ---
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "CHAT_ID";
pub const ENV_NEWS_LANGUAGE: &str = "NEWS_LANGUAGE";
pub const ENV_NEWS_PAGE_SIZE: &str = "NEWS_PAGE_SIZE";
pub const ENV_POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";
pub const ENV_SENT_STORE_PATH: &str = "SENT_STORE_PATH";

// --- defaults ---
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_SENT_STORE_PATH: &str = "sent_headlines.txt";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub news_api_key: String,
    pub openai_api_key: String,
    /// `None` means the classifier's default model.
    pub openai_model: Option<String>,
    pub bot_token: String,
    pub chat_id: String,
    pub language: String,
    pub page_size: u32,
    pub poll_interval_secs: u64,
    pub sent_store_path: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            news_api_key: require(ENV_NEWS_API_KEY)?,
            openai_api_key: require(ENV_OPENAI_API_KEY)?,
            openai_model: optional(ENV_OPENAI_MODEL),
            bot_token: require(ENV_BOT_TOKEN)?,
            chat_id: require(ENV_CHAT_ID)?,
            language: optional(ENV_NEWS_LANGUAGE).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            page_size: parse_or(ENV_NEWS_PAGE_SIZE, DEFAULT_PAGE_SIZE),
            poll_interval_secs: parse_or(ENV_POLL_INTERVAL_SECS, DEFAULT_POLL_INTERVAL_SECS),
            sent_store_path: optional(ENV_SENT_STORE_PATH)
                .unwrap_or_else(|| DEFAULT_SENT_STORE_PATH.to_string()),
        })
    }
}

fn require(name: &str) -> Result<String> {
    let v = std::env::var(name).with_context(|| format!("missing required env var {name}"))?;
    let v = v.trim().to_string();
    if v.is_empty() {
        bail!("env var {name} is set but empty");
    }
    Ok(v)
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
