use crate::oracle::{DEFAULT_BASE_URL, DEFAULT_MODELS};
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_DATA_PATH: &str = "data/diary.json";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POLL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    pub api_key: Option<String>,
    pub models: Vec<String>,
    pub base_url: String,
    pub notify_poll: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from any variable source. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let models: Vec<String> = non_empty("ORACLE_MODELS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|model| !model.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            data_path: non_empty("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            port: non_empty("PORT")
                .and_then(|value| value.trim().parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            api_key: non_empty("GEMINI_API_KEY").map(|key| key.trim().to_string()),
            models: if models.is_empty() {
                DEFAULT_MODELS.iter().map(|model| model.to_string()).collect()
            } else {
                models
            },
            base_url: non_empty("ORACLE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            notify_poll: Duration::from_secs(
                non_empty("NOTIFY_POLL_SECS")
                    .and_then(|value| value.trim().parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_POLL_SECS),
            ),
        }
    }
}
