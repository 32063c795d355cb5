use crate::errors::ConfigError;
use crate::fetch::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub cache_dir: PathBuf,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("MOOD_API_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing("MOOD_API_URL"))?;

        let cache_dir = lookup("MOOD_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/cache"));

        let max_retries = match lookup("MOOD_MAX_RETRIES") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "MOOD_MAX_RETRIES",
                value,
            })?,
            None => DEFAULT_MAX_RETRIES,
        };

        let retry_delay = match lookup("MOOD_RETRY_DELAY_MS") {
            Some(value) => value
                .trim()
                .parse()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid {
                    key: "MOOD_RETRY_DELAY_MS",
                    value,
                })?,
            None => DEFAULT_RETRY_DELAY,
        };

        Ok(Self {
            api_url,
            cache_dir,
            max_retries,
            retry_delay,
        })
    }
}
