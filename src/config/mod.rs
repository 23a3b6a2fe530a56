//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast on malformed values. Every variable
//! is optional.

use std::str::FromStr;
use std::time::Duration;

use crate::engine::{ErrorStrategy, ExecutorConfig};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub dry_run: bool,
    pub max_concurrent: usize,
    pub error_strategy: ErrorStrategy,
    pub timeout: Option<Duration>,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let max_concurrent = parsed_var("RGRAPH_MAX_CONCURRENT")?.unwrap_or(4);
        if max_concurrent == 0 {
            return Err(Error::Config(
                "RGRAPH_MAX_CONCURRENT must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            dry_run: parsed_var("RGRAPH_DRY_RUN")?.unwrap_or(false),
            max_concurrent,
            error_strategy: parsed_var("RGRAPH_ERROR_STRATEGY")?.unwrap_or_default(),
            timeout: parsed_var::<u64>("RGRAPH_TIMEOUT_SECS")?.map(Duration::from_secs),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            dry_run: self.dry_run,
            error_strategy: self.error_strategy,
            max_concurrent: self.max_concurrent,
            timeout: self.timeout,
        }
    }
}

fn parsed_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid value for {name}: {raw:?} ({e})"))),
        Err(_) => Ok(None),
    }
}
