//! URL shortening tool definition.
//!
//! Calls the TinyURL API. The API token comes from `TINYURL_API_TOKEN`; when
//! it is absent the module still loads and each call fails with a clear
//! message instead.

use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::core::config::Config;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::{ToolHandler, ToolModule};
use crate::domains::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::domains::tools::schema::{ParamSpec, ParamType, ToolArgs};

const REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TinyUrlResponse {
    data: Option<TinyUrlData>,
}

#[derive(Debug, Deserialize)]
struct TinyUrlData {
    tiny_url: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// URL shortener module.
pub struct UrlShortenerModule;

impl UrlShortenerModule {
    /// Module name as matched by discovery.
    pub const MODULE: &'static str = "urlshortener";

    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "urlshortener";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Return a shortened URL via the TinyURL service";
}

impl ToolModule for UrlShortenerModule {
    fn name(&self) -> &'static str {
        Self::MODULE
    }

    fn register(&self, registry: &mut ToolRegistry, config: &Config) -> Result<(), ToolError> {
        let shortener = UrlShortener::new(
            config.tools.tinyurl_api_url.clone(),
            config.credentials.tinyurl_api_token.clone(),
        )?;

        registry.register(
            ToolDescriptor::new(Self::NAME, Self::DESCRIPTION, shortener)
                .param(ParamSpec::required("url", ParamType::String, "The URL to be shortened"))
                .param(ParamSpec::required(
                    "full_name",
                    ParamType::String,
                    "User name for logging purposes",
                )),
        )
    }
}

/// TinyURL API client.
pub struct UrlShortener {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl UrlShortener {
    pub fn new(api_url: impl Into<String>, api_token: Option<String>) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ToolError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Execute the tool logic.
    #[instrument(skip(self))]
    pub async fn shorten(&self, url: &str, full_name: &str) -> Result<String, ToolError> {
        info!("🔧 Tool called: urlshortener() by {}", full_name);

        let Some(token) = &self.api_token else {
            error!("❌ TINYURL_API_TOKEN not found in environment variables");
            return Err(ToolError::execution("API token not configured"));
        };

        match reqwest::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(ToolError::execution(format!(
                    "Invalid URL '{}': only http and https URLs can be shortened",
                    url
                )));
            }
        }

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|e| {
                error!("❌ Network error: {}", e);
                if e.is_timeout() {
                    ToolError::timeout("TinyURL request timed out")
                } else {
                    ToolError::execution(format!("Network error occurred: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("Error {}: {}", status.as_u16(), body);
            error!("❌ TinyURL API error: {}", message);
            return Err(ToolError::execution(format!(
                "Error shortening URL: {}",
                message
            )));
        }

        let payload: TinyUrlResponse = response.json().await.map_err(|e| {
            error!("❌ JSON parsing error: {}", e);
            ToolError::execution(format!("Error parsing API response: {}", e))
        })?;

        let short = payload
            .data
            .and_then(|d| d.tiny_url)
            .ok_or_else(|| ToolError::execution("Error parsing API response: missing tiny_url"))?;

        info!("✅ URL shortened successfully: {} -> {}", url, short);
        Ok(short)
    }
}

#[async_trait::async_trait]
impl ToolHandler for UrlShortener {
    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        let url = args.string("url")?;
        let full_name = args.string("full_name")?;
        self.shorten(&url, &full_name).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_missing_token_fails_gracefully() {
        let shortener = assert_ok!(UrlShortener::new("http://127.0.0.1:9/create", None));
        let err = assert_err!(shortener.shorten("https://example.com", "Tester").await);
        assert_eq!(err, ToolError::execution("API token not configured"));
    }

    #[tokio::test]
    async fn test_blank_token_counts_as_missing() {
        let shortener =
            UrlShortener::new("http://127.0.0.1:9/create", Some("   ".to_string())).unwrap();
        let err = shortener.shorten("https://example.com", "T").await.unwrap_err();
        assert_eq!(err, ToolError::execution("API token not configured"));
    }

    #[tokio::test]
    async fn test_non_http_url_rejected() {
        let shortener =
            UrlShortener::new("http://127.0.0.1:9/create", Some("token".to_string())).unwrap();
        let err = shortener.shorten("file:///etc/passwd", "T").await.unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));
    }

    #[test]
    fn test_module_loads_without_token() {
        let mut config = Config::default();
        config.credentials.tinyurl_api_token = None;

        let mut registry = ToolRegistry::new();
        UrlShortenerModule.register(&mut registry, &config).unwrap();
        assert!(registry.lookup(UrlShortenerModule::NAME).is_ok());
    }

    #[cfg(feature = "http")]
    mod stub_api {
        use super::*;
        use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};

        async fn create(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> (StatusCode, Json<serde_json::Value>) {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer good-token");
            if !authorized {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({ "errors": ["Unauthorized"] })),
                );
            }
            let url = body["url"].as_str().unwrap_or_default();
            let tiny = format!("https://tinyurl.com/{}", url.len());
            (
                StatusCode::OK,
                Json(serde_json::json!({ "data": { "tiny_url": tiny } })),
            )
        }

        async fn spawn_stub() -> String {
            let app = Router::new().route("/create", post(create));
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{}/create", addr)
        }

        #[tokio::test]
        async fn test_shorten_success() {
            let api_url = spawn_stub().await;
            let shortener = UrlShortener::new(api_url, Some("good-token".to_string())).unwrap();

            let short = shortener
                .shorten("https://example.com", "Tester")
                .await
                .unwrap();
            assert_eq!(short, "https://tinyurl.com/19");
        }

        #[tokio::test]
        async fn test_shorten_api_error() {
            let api_url = spawn_stub().await;
            let shortener = UrlShortener::new(api_url, Some("bad-token".to_string())).unwrap();

            let err = shortener
                .shorten("https://example.com", "Tester")
                .await
                .unwrap_err();
            let ToolError::Execution(msg) = err else {
                panic!("expected execution error");
            };
            assert!(msg.starts_with("Error shortening URL: Error 401"));
        }
    }
}
