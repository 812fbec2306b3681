use std::{env, net::SocketAddr};

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8811/mcp";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_BRIDGE_BACKEND_URL must be an absolute http(s) URL")]
    InvalidBackendUrl,
    #[error("GEMINI_API_KEY is required and must not be empty")]
    MissingApiKey,
    #[error("GEMINI_API_BASE must be an absolute http(s) URL")]
    InvalidApiBase,
    #[error("GEMINI_MODEL must not contain '/', '?' or whitespace")]
    InvalidModel,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

/// Settings for the stdio bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub backend_url: Url,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = non_empty(lookup("GEMINI_BRIDGE_BACKEND_URL"))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = parse_http_url(&raw).ok_or(ConfigError::InvalidBackendUrl)?;

        Ok(Self { backend_url })
    }
}

/// Settings for the HTTP gateway in front of the Gemini API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub api_base: Url,
    pub model: String,
    pub bind_addr: String,
    pub bind_port: u16,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = non_empty(lookup("GEMINI_API_KEY")).ok_or(ConfigError::MissingApiKey)?;

        let api_base = non_empty(lookup("GEMINI_API_BASE"))
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string());
        let api_base = parse_http_url(&api_base).ok_or(ConfigError::InvalidApiBase)?;

        let model =
            non_empty(lookup("GEMINI_MODEL")).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        if model
            .chars()
            .any(|character| character == '/' || character == '?' || character.is_whitespace())
        {
            return Err(ConfigError::InvalidModel);
        }

        let bind_addr = non_empty(lookup("BIND_ADDR")).unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = non_empty(lookup("BIND_PORT"))
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8811);

        let config = Self {
            api_key,
            api_base,
            model,
            bind_addr,
            bind_port,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }

    /// `generateContent` endpoint for the configured model, without the key.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.as_str().trim_end_matches('/'),
            self.model
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_http_url(raw: &str) -> Option<Url> {
    Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn bridge_defaults_to_local_backend() {
        let config = BridgeConfig::from_lookup(lookup(&[])).expect("config should parse");
        assert_eq!(config.backend_url.as_str(), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn bridge_accepts_backend_override() {
        let config = BridgeConfig::from_lookup(lookup(&[(
            "GEMINI_BRIDGE_BACKEND_URL",
            " http://10.0.0.5:9000/ask ",
        )]))
        .expect("config should parse");
        assert_eq!(config.backend_url.as_str(), "http://10.0.0.5:9000/ask");
    }

    #[test]
    fn bridge_rejects_non_http_backend() {
        let err = BridgeConfig::from_lookup(lookup(&[(
            "GEMINI_BRIDGE_BACKEND_URL",
            "ftp://127.0.0.1/mcp",
        )]))
        .expect_err("expected invalid backend url");
        assert!(matches!(err, ConfigError::InvalidBackendUrl));
    }

    #[test]
    fn gateway_parse_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "abc")]))
            .expect("config should parse");
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.bind_port, 8811);
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(
            config.generate_content_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn gateway_missing_key_fails() {
        let err = GatewayConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")]))
            .expect_err("expected missing key error");
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn gateway_invalid_port_fails() {
        let err = GatewayConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "abc"),
            ("BIND_PORT", "99999"),
        ]))
        .expect_err("expected invalid port error");
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn gateway_rejects_model_with_path_separator() {
        let err = GatewayConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "abc"),
            ("GEMINI_MODEL", "../secrets"),
        ]))
        .expect_err("expected invalid model error");
        assert!(matches!(err, ConfigError::InvalidModel));
    }
}
