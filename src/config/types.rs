use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version sent as `v` on every call
    #[serde(default = "default_version")]
    pub version: String,

    /// User or community access token. Overridden by `VKVIDEO_ACCESS_TOKEN`.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Language for localized fields (`ru`, `en`, ...)
    #[serde(default)]
    pub lang: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_base_url() -> String {
    "https://api.vk.com/method".to_string()
}
fn default_version() -> String {
    "5.27".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_requests_per_second() -> u32 {
    3
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            version: default_version(),
            access_token: None,
            lang: None,
            timeout_secs: default_timeout(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("vkvideo.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}
