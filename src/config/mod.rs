mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable that overrides `api.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "VKVIDEO_ACCESS_TOKEN";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./vkvideo.toml",
        "~/.config/vkvideo/config.toml",
        "/etc/vkvideo/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        if !token.is_empty() {
            config.api.access_token = Some(token);
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url cannot be empty");
    }
    if config.api.version.trim().is_empty() {
        anyhow::bail!("api.version cannot be empty");
    }
    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs cannot be 0");
    }
    if config.api.requests_per_second == 0 {
        anyhow::bail!("api.requests_per_second cannot be 0");
    }
    if config.database.path.as_os_str().is_empty() {
        anyhow::bail!("database.path cannot be empty");
    }

    if config.api.access_token.as_deref().unwrap_or("").is_empty() {
        tracing::warn!("No access token configured; only public data will be reachable");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.api.version, "5.27");
        assert_eq!(config.api.requests_per_second, 3);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            lang = "en"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.lang.as_deref(), Some("en"));
        assert_eq!(config.api.base_url, "https://api.vk.com/method");
        assert_eq!(config.database.path, Path::new("vkvideo.db"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_version_rejected() {
        let mut config = Config::default();
        config.api.version = " ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
