use std::fs;

use serde::Deserialize;
use tracing::warn;
use url::Url;

/// Credentials for the hosted notes table. Either field may be absent; the
/// gateway degrades to unavailable instead of failing at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    pub endpoint_url: Option<String>,
    pub access_key: Option<String>,
}

impl BackendConfig {
    /// Both credentials, or `None` when either is missing or blank. The
    /// endpoint loses any trailing slash so callers can join paths onto it.
    pub fn credentials(&self) -> Option<(String, String)> {
        let endpoint = self.endpoint_url.as_deref()?.trim();
        let key = self.access_key.as_deref()?.trim();
        if endpoint.is_empty() || key.is_empty() {
            return None;
        }
        Some((endpoint.trim_end_matches('/').to_string(), key.to_string()))
    }
}

/// Defaults, then `notes.toml` in the working directory, then environment
/// overrides. A malformed file or endpoint is logged and treated as absent.
pub fn load_config() -> BackendConfig {
    let mut config = BackendConfig::default();

    if let Ok(raw) = fs::read_to_string("notes.toml") {
        match toml::from_str::<BackendConfig>(&raw) {
            Ok(file_cfg) => {
                if file_cfg.endpoint_url.is_some() {
                    config.endpoint_url = file_cfg.endpoint_url;
                }
                if file_cfg.access_key.is_some() {
                    config.access_key = file_cfg.access_key;
                }
            }
            Err(err) => warn!("ignoring malformed notes.toml: {err}"),
        }
    }

    if let Ok(v) = std::env::var("NOTES_ENDPOINT_URL") {
        config.endpoint_url = Some(v);
    }
    if let Ok(v) = std::env::var("NOTES_ACCESS_KEY") {
        config.access_key = Some(v);
    }

    if let Some(endpoint) = &config.endpoint_url {
        if Url::parse(endpoint).is_err() {
            warn!("endpoint url '{endpoint}' is not a valid url; backend will be unavailable");
            config.endpoint_url = None;
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_fields() {
        let config = BackendConfig {
            endpoint_url: Some("https://demo.example.co".into()),
            access_key: None,
        };
        assert!(config.credentials().is_none());

        let config = BackendConfig {
            endpoint_url: None,
            access_key: Some("service-key".into()),
        };
        assert!(config.credentials().is_none());
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let config = BackendConfig {
            endpoint_url: Some("   ".into()),
            access_key: Some("service-key".into()),
        };
        assert!(config.credentials().is_none());
    }

    #[test]
    fn credentials_strip_trailing_slash() {
        let config = BackendConfig {
            endpoint_url: Some("https://demo.example.co/".into()),
            access_key: Some("service-key".into()),
        };
        let (endpoint, key) = config.credentials().expect("credentials");
        assert_eq!(endpoint, "https://demo.example.co");
        assert_eq!(key, "service-key");
    }

    #[test]
    fn config_file_fields_are_optional() {
        let config: BackendConfig =
            toml::from_str("endpoint_url = \"https://demo.example.co\"").expect("parse");
        assert_eq!(
            config.endpoint_url.as_deref(),
            Some("https://demo.example.co")
        );
        assert!(config.access_key.is_none());
    }
}
