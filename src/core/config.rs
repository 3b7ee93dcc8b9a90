//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (and a `.env` file) or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default public endpoint of the TinyURL API.
pub const DEFAULT_TINYURL_API_URL: &str = "https://api.tinyurl.com/create";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Tool discovery and execution configuration.
    pub tools: ToolsConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,

    /// Problems found while loading, logged once logging is up.
    #[serde(skip)]
    pub notices: Vec<String>,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Tool discovery and execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Directory whose entries name the enabled tool modules.
    pub enabled_dir: Option<PathBuf>,

    /// Explicit list of enabled tool modules (used when no directory is set).
    pub enabled: Option<Vec<String>>,

    /// Default per-invocation timeout in seconds.
    pub timeout_secs: u64,

    /// Path or name of the nmap binary.
    pub nmap_path: String,

    /// TinyURL create endpoint.
    pub tinyurl_api_url: String,
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// TinyURL API token. Without it the URL shortener fails per call.
    pub tinyurl_api_token: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "tinyurl_api_token",
                &self.tinyurl_api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled_dir: None,
            enabled: None,
            timeout_secs: 60,
            nmap_path: "nmap".to_string(),
            tinyurl_api_url: DEFAULT_TINYURL_API_URL.to_string(),
        }
    }
}

impl ToolsConfig {
    /// Default per-invocation timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "Santo MCP Server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            tools: ToolsConfig::default(),
            credentials: CredentialsConfig::default(),
            notices: Vec::new(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`. The TinyURL token
    /// keeps its conventional name, `TINYURL_API_TOKEN`.
    ///
    /// Runs before logging is initialized, so anything worth reporting is
    /// collected into [`Config::notices`] instead of being logged here.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = timestamps.to_lowercase() != "false" && timestamps != "0";
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        // Tool discovery
        if let Ok(dir) = std::env::var("MCP_TOOLS_DIR") {
            config.tools.enabled_dir = Some(PathBuf::from(dir));
        }

        if let Ok(enabled) = std::env::var("MCP_TOOLS_ENABLED") {
            config.tools.enabled = Some(
                enabled
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }

        if let Ok(timeout) = std::env::var("MCP_TOOL_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.tools.timeout_secs = secs,
                Err(_) => config.notices.push(format!(
                    "Ignoring invalid MCP_TOOL_TIMEOUT_SECS={:?}, using {}s",
                    timeout, config.tools.timeout_secs
                )),
            }
        }

        if let Ok(nmap_path) = std::env::var("MCP_NMAP_PATH") {
            config.tools.nmap_path = nmap_path;
        }

        if let Ok(api_url) = std::env::var("MCP_TINYURL_API_URL") {
            config.tools.tinyurl_api_url = api_url;
        }

        // Load TinyURL API token
        match std::env::var("TINYURL_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => {
                config.credentials.tinyurl_api_token = Some(token);
            }
            _ => config.notices.push(
                "TINYURL_API_TOKEN not set - the urlshortener tool will report an error when called"
                    .to_string(),
            ),
        }

        config
    }
}

// Mutex to ensure env var tests run serially, across modules
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("TINYURL_API_TOKEN", "test_token_12345");
        }
        let config = Config::from_env();
        assert_eq!(
            config.credentials.tinyurl_api_token.as_deref(),
            Some("test_token_12345")
        );
        unsafe {
            std::env::remove_var("TINYURL_API_TOKEN");
        }
    }

    #[test]
    fn test_enabled_modules_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_TOOLS_ENABLED", " hellomcp, ,nmap ");
            std::env::set_var("MCP_TOOL_TIMEOUT_SECS", "15");
        }
        let config = Config::from_env();
        assert_eq!(
            config.tools.enabled,
            Some(vec!["hellomcp".to_string(), "nmap".to_string()])
        );
        assert_eq!(config.tools.timeout(), Duration::from_secs(15));
        unsafe {
            std::env::remove_var("MCP_TOOLS_ENABLED");
            std::env::remove_var("MCP_TOOL_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_TOOL_TIMEOUT_SECS", "soon");
        }
        let config = Config::from_env();
        assert_eq!(config.tools.timeout_secs, 60);
        assert!(
            config
                .notices
                .iter()
                .any(|n| n.contains("MCP_TOOL_TIMEOUT_SECS"))
        );
        unsafe {
            std::env::remove_var("MCP_TOOL_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_missing_token_becomes_notice() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("TINYURL_API_TOKEN");
        }
        let config = Config::from_env();
        assert!(config.credentials.tinyurl_api_token.is_none());
        assert!(
            config
                .notices
                .iter()
                .any(|n| n.starts_with("TINYURL_API_TOKEN not set"))
        );
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let creds = CredentialsConfig {
            tinyurl_api_token: Some("super_secret_token".to_string()),
        };
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_token"));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.server.name, "Santo MCP Server");
        assert!(config.credentials.tinyurl_api_token.is_none());
        assert_eq!(config.tools.nmap_path, "nmap");
        assert_eq!(config.tools.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let tools = ToolsConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(tools.timeout(), Duration::from_secs(1));
    }
}
