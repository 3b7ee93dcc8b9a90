//! HTTP transport implementation.
//!
//! HTTP server with JSON-RPC over POST requests on the configured path, plus
//! a plain `POST /invoke` endpoint that takes an invocation request and
//! answers with the result envelope directly.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::core::server::SERVER_INSTRUCTIONS;
use crate::domains::tools::{Envelope, InvocationRequest};

/// MCP protocol revision spoken by the HTTP transport.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    server: McpServer,
    rpc_path: String,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum router serving `server`.
    pub fn router(&self, server: McpServer) -> Router {
        let state = AppState {
            server,
            rpc_path: self.config.rpc_path.clone(),
        };

        let app = Router::new()
            .route(&self.config.rpc_path, post(handle_rpc))
            .route("/invoke", post(handle_invoke))
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state);

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app.layer(cors)
        } else {
            app
        }
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (JSON-RPC over HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Invoke:   POST /invoke");
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "invoke": "/invoke",
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "tools": state.server.dispatcher().registry().tool_names(),
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "tools": state.server.dispatcher().registry().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle a bare invocation request.
#[instrument(skip_all, fields(tool))]
async fn handle_invoke(
    State(state): State<AppState>,
    Json(request): Json<InvocationRequest>,
) -> Json<Envelope> {
    tracing::Span::current().record("tool", &request.name);
    info!("Received invoke request: {}", request.name);

    Json(state.server.dispatcher().dispatch(request).await)
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    tracing::Span::current().record("method", &request.method);
    info!("Received JSON-RPC request: {}", request.method);

    let response = process_request(&state, request).await;

    (StatusCode::OK, Json(response))
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),
        "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
        "tools/list" => handle_tools_list(state, request),
        "tools/call" => handle_tools_call(state, request).await,

        // Stateless transport: notifications are acknowledged and dropped
        method if method.starts_with("notifications/") => {
            info!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, serde_json::json!(null))
        }

        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let result = serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": SERVER_INSTRUCTIONS
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/list request.
fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let tools = state.server.list_tools();
    JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
}

/// Handle tools/call request.
///
/// Tool failures are not JSON-RPC errors: they come back as a result with
/// `isError` set and the envelope attached as structured content.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };

    let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    let envelope = state.server.call_tool(name, arguments).await;
    let text = match envelope.kind() {
        None => envelope.text().to_string(),
        Some(kind) => format!("[{}] {}", kind, envelope.text()),
    };

    let result = serde_json::json!({
        "content": [{ "type": "text", "text": text }],
        "isError": !envelope.ok,
        "structuredContent": envelope,
    });
    JsonRpcResponse::success(request.id, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use bytes::Bytes;
    use http::{Request, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let mut config = Config::default();
        config.tools.enabled = Some(vec!["hellomcp".to_string()]);
        let (server, _) = McpServer::bootstrap(config).unwrap();
        HttpTransport::new(HttpConfig::default()).router(server)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes: Bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn rpc(method: &str, params: Value) -> Value {
        json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params })
    }

    #[tokio::test]
    async fn test_initialize_advertises_tools_only() {
        let (status, body) = post_json(app(), "/mcp", rpc("initialize", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let caps = &body["result"]["capabilities"];
        assert!(caps.get("tools").is_some());
        assert!(caps.get("prompts").is_none());
        assert_eq!(body["result"]["serverInfo"]["name"], "Santo MCP Server");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let (_, body) = post_json(app(), "/mcp", rpc("tools/list", json!({}))).await;
        let tools = body["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "hellomcp");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["full_name"]));
    }

    #[tokio::test]
    async fn test_tools_call_success_and_failure() {
        let params = json!({ "name": "hellomcp", "arguments": { "full_name": "Ada" } });
        let (_, body) = post_json(app(), "/mcp", rpc("tools/call", params)).await;
        assert_eq!(body["result"]["isError"], false);
        assert_eq!(body["result"]["content"][0]["text"], "Hello Ada !!");
        assert_eq!(body["result"]["structuredContent"]["result"], "Hello Ada !!");

        let params = json!({ "name": "hellomcp", "arguments": {} });
        let (_, body) = post_json(app(), "/mcp", rpc("tools/call", params)).await;
        assert_eq!(body["result"]["isError"], true);
        assert_eq!(
            body["result"]["structuredContent"]["error"]["kind"],
            "InvalidArguments"
        );
    }

    #[tokio::test]
    async fn test_tools_call_without_name_is_invalid_params() {
        let (_, body) = post_json(app(), "/mcp", rpc("tools/call", json!({}))).await;
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_version() {
        let (_, body) = post_json(app(), "/mcp", rpc("resources/list", json!({}))).await;
        assert_eq!(body["error"]["code"], -32601);

        let request = json!({ "jsonrpc": "1.0", "id": 7, "method": "tools/list" });
        let (_, body) = post_json(app(), "/mcp", request).await;
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["id"], 7);
    }

    #[tokio::test]
    async fn test_invoke_returns_envelope() {
        let request = json!({ "name": "hellomcp", "arguments": { "full_name": "Linus" } });
        let (status, body) = post_json(app(), "/invoke", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "ok": true, "result": "Hello Linus !!", "error": null })
        );

        let (_, body) = post_json(app(), "/invoke", json!({ "name": "nope" })).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["kind"], "UnknownTool");
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/health")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["tools"], 1);
    }
}
