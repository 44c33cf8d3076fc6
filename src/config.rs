use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::conflicts::FailurePolicy;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Conflict computation
    pub conflict_debounce: Duration,
    pub conflict_failure_policy: FailurePolicy,

    pub schedule_cache_ttl: Duration,
}

/// Reads `key`, falling back to `default` when unset, and parses it.
fn var_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid value {:?} for {}: {}", raw, key, e))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", "1000")?,

            conflict_debounce: Duration::from_millis(var_or("CONFLICT_DEBOUNCE_MS", "300")?), // quiescence before recomputing
            conflict_failure_policy: var_or("CONFLICT_FAILURE_POLICY", "fail_closed")?,

            schedule_cache_ttl: Duration::from_secs(var_or("SCHEDULE_CACHE_TTL_SECS", "300")?),
        })
    }
}
