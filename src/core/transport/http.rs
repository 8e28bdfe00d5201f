//! HTTP transport implementation.
//!
//! Serves two surfaces over the same dispatcher:
//! - the REST tool API (`/health`, `/.well-known/mcp`, `/databases`,
//!   `POST /mcp/call`)
//! - JSON-RPC 2.0 over POST on the configured path (default `/mcp`)

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http::{HeaderName, HeaderValue, Method, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig, shutdown_signal};
use crate::core::McpServer;
use crate::domains::tools::router::to_call_result;
use crate::domains::tools::{ToolError, ToolFailure};

/// Version reported by the discovery manifest.
const MANIFEST_VERSION: &str = "1.0";

/// MCP protocol revision answered to `initialize`.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Hardening headers added to every response that does not set them itself.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
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
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    /// Parse error: the body is not JSON.
    pub fn parse_error() -> Self {
        Self::error(None, -32700, "Parse error")
    }
}

/// Body of `POST /mcp/call`.
///
/// Both fields are read leniently so that a missing or mistyped `tool`
/// becomes a `missing_tool` envelope instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
struct CallRequest {
    #[serde(default)]
    tool: Value,
    #[serde(default)]
    parameters: Value,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    server: McpServer,
    rpc_path: String,
}

impl AppState {
    pub fn new(server: McpServer, rpc_path: impl Into<String>) -> Self {
        Self {
            server,
            rpc_path: rpc_path.into(),
        }
    }
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

    /// Run the HTTP transport until a shutdown signal arrives.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = build_router(AppState::new(server, &self.config.rpc_path), &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → Tools:     POST /mcp/call");
        info!("  → Manifest:  GET /.well-known/mcp");
        info!("  → Health:    GET /health");
        info!("  → Databases: GET /databases");
        info!("  → JSON-RPC:  POST {}", self.config.rpc_path);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(TransportError::Serve)
    }
}

/// Build the router with every route and layer.
pub fn build_router(state: AppState, config: &HttpConfig) -> Router {
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/.well-known/mcp", get(manifest))
        .route("/databases", get(databases))
        .route("/mcp/call", post(call_tool))
        .route(&config.rpc_path, post(handle_rpc))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(config.body_limit_bytes)),
        );

    for &(name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    if config.enable_cors {
        app = app.layer(cors_layer());
    }
    app
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

// Bare `OPTIONS` (no preflight headers) succeeds on any path.

async fn not_found(method: Method) -> Response {
    unrouted(method, StatusCode::NOT_FOUND, "Not found")
}

async fn method_not_allowed(method: Method) -> Response {
    unrouted(method, StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn unrouted(method: Method, status: StatusCode, error: &str) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        (status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "call": "/mcp/call",
            "manifest": "/.well-known/mcp",
            "health": "/health",
            "databases": "/databases",
            "rpc": state.rpc_path
        }
    }))
}

/// Health check endpoint. Always 200; degradation is in the body.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.server.health().health().await)
}

/// Discovery manifest.
async fn manifest(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "mcp_version": MANIFEST_VERSION,
        "name": state.server.name(),
        "description": state.server.config().server.description,
        "tools": state.server.describe()
    }))
}

/// Detailed per-backend status.
async fn databases(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.server.health().databases().await)
}

/// Invoke a tool through the dispatcher.
///
/// A body without a JSON content type names no tool; an unreadable JSON body
/// is an `invalid_request` envelope.
#[instrument(skip_all)]
async fn call_tool(
    State(state): State<AppState>,
    payload: Result<Json<CallRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => CallRequest::default(),
        Err(rejection) => {
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            let err = ToolError::InvalidRequest(rejection.body_text());
            warn!("Rejected /mcp/call body: {}", err);
            return (status, Json(ToolFailure::new(None, &err).into_json())).into_response();
        }
    };
    let tool = request.tool.as_str().unwrap_or_default();

    match state.server.dispatcher().invoke(tool, request.parameters).await {
        Ok(success) => (StatusCode::OK, Json(success.into_json())).into_response(),
        Err(failure) => {
            let status = if failure.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(failure.into_json())).into_response()
        }
    }
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    payload: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::JsonDataError(e)) => {
            warn!("Malformed JSON-RPC request: {}", e.body_text());
            return (StatusCode::OK, Json(JsonRpcResponse::invalid_request(None)));
        }
        Err(rejection) => {
            warn!("Unreadable JSON-RPC body: {}", rejection.body_text());
            return (StatusCode::OK, Json(JsonRpcResponse::parse_error()));
        }
    };
    tracing::Span::current().record("method", request.method.as_str());
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
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => handle_tools_list(state, request),
        "tools/call" => handle_tools_call(state, request).await,

        // Notifications (no response needed for stateless HTTP)
        method if method.starts_with("notifications/") => {
            info!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, Value::Null)
        }

        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": state.server.instructions()
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/list request.
fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(request.id, json!({ "tools": state.server.list_tools() }))
}

/// Handle tools/call request.
///
/// Tool failures are reported in the result (`isError: true`); only a
/// malformed request is a JSON-RPC error.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = match request.params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
    };

    let name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n.to_string(),
        None => return JsonRpcResponse::invalid_params(request.id, "Missing tool name"),
    };

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
    let outcome = state.server.dispatcher().invoke(&name, arguments).await;

    match serde_json::to_value(to_call_result(outcome)) {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::error(request.id, -32603, e.to_string()),
    }
}
