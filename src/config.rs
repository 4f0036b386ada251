use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    // Portal backend
    pub api_base_url: String,

    // Location services
    pub reverse_geocode_url: String,
    pub position_api_url: Option<String>,

    // Client behavior
    pub http_timeout: Duration,
    pub session_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let api_base_url = env("PORTAL_API_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();
        let reverse_geocode_url = env(
            "REVERSE_GEOCODE_URL",
            "https://nominatim.openstreetmap.org/reverse",
        );
        // Empty value disables automatic positioning entirely.
        let position_api_url = {
            let raw = env("POSITION_API_URL", "http://ip-api.com/json");
            if raw.is_empty() {
                None
            } else {
                Some(raw)
            }
        };
        let http_timeout = humantime::parse_duration(&env("HTTP_TIMEOUT", "30s"))
            .context("HTTP_TIMEOUT parse")?;
        let session_file = PathBuf::from(env("SESSION_FILE", ".portal-session.json"));

        Ok(Self {
            api_base_url,
            reverse_geocode_url,
            position_api_url,
            http_timeout,
            session_file,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "PORTAL_API_URL".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        if self.reverse_geocode_url.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "REVERSE_GEOCODE_URL".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "HTTP_TIMEOUT".to_string(),
                "cannot be zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            api_base_url: "http://localhost:3000".to_string(),
            reverse_geocode_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            position_api_url: Some("http://ip-api.com/json".to_string()),
            http_timeout: Duration::from_secs(30),
            session_file: PathBuf::from(".portal-session.json"),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(base_config().validate().is_ok());

        let mut no_api = base_config();
        no_api.api_base_url = String::new();
        assert!(no_api.validate().is_err());

        let mut no_geocoder = base_config();
        no_geocoder.reverse_geocode_url = String::new();
        assert!(no_geocoder.validate().is_err());

        let mut zero_timeout = base_config();
        zero_timeout.http_timeout = Duration::ZERO;
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_position_source_can_be_disabled() {
        let mut config = base_config();
        config.position_api_url = None;
        assert!(config.validate().is_ok());
    }
}
