//! HTTP transport
//!
//! `/mcp` carries the JSON-RPC envelope; `/tools` and `/tools/:name` are the
//! REST shortcut. Both route through the same [`Dispatcher`], on the blocking
//! pool so store access never stalls the executor.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::SyliusError;
use crate::mcp::{Dispatcher, JsonRpcHandler, McpHandler, McpRequest, McpResponse};

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
    rpc: JsonRpcHandler,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            rpc: JsonRpcHandler::new(dispatcher.clone()),
            dispatcher,
        }
    }
}

/// Body of a REST tool call response; always sent with status 200
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RestResponse {
    Result { result: Value },
    Error { error: String },
}

impl RestResponse {
    fn error(message: impl Into<String>) -> Self {
        RestResponse::Error {
            error: message.into(),
        }
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/mcp", post(mcp_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/:name", post(call_tool_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);

    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({"message": "Sylius MCP server is running"}))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "healthy"}))
}

async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> Json<McpResponse> {
    let request = match McpRequest::parse(&body) {
        Ok(request) => request,
        Err(response) => return Json(response),
    };
    let id = request.id.clone();

    let rpc = state.rpc.clone();
    match tokio::task::spawn_blocking(move || rpc.handle_request(request)).await {
        Ok(response) => Json(response),
        Err(e) => {
            tracing::error!("JSON-RPC worker failed: {}", e);
            Json(McpResponse::from_error(id, SyliusError::Internal(e.to_string())))
        }
    }
}

async fn list_tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"tools": state.dispatcher.registry().rest_descriptors()}))
}

async fn call_tool_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Json<RestResponse> {
    let arguments = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => payload.get("arguments").cloned().unwrap_or(Value::Null),
            Err(e) => return Json(RestResponse::error(format!("Invalid JSON body: {}", e))),
        }
    };

    let dispatcher = state.dispatcher.clone();
    let outcome =
        tokio::task::spawn_blocking(move || dispatcher.dispatch(&name, &arguments)).await;

    Json(match outcome {
        Ok(Ok(output)) => RestResponse::Result {
            result: output.into_value(),
        },
        Ok(Err(e)) => RestResponse::error(e.to_string()),
        Err(e) => {
            tracing::error!("REST worker failed: {}", e);
            RestResponse::error(e.to_string())
        }
    })
}
