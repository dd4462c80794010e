use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://quizsmith.db?mode=rwc";
pub const DEFAULT_TIMER_TICK_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_endpoint: String,
    pub database_url: String,
    pub gemini_api_key: Option<String>,
    pub timer_tick_ms: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let timer_tick_ms = get_env_parse_or("QUIZ_TIMER_TICK_MS", DEFAULT_TIMER_TICK_MS)?;
        if timer_tick_ms == 0 {
            return Err(Error::Config(
                "QUIZ_TIMER_TICK_MS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            gemini_endpoint: get_env_or("GEMINI_API_ENDPOINT", DEFAULT_GEMINI_ENDPOINT),
            database_url: get_env_or("QUIZSMITH_DATABASE_URL", DEFAULT_DATABASE_URL),
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timer_tick_ms,
        })
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
