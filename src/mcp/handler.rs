//! JSON-RPC adapter over the dispatcher

use std::sync::Arc;

use serde_json::{json, Value};

use super::dispatch::Dispatcher;
use super::protocol::{
    methods, InitializeResult, McpHandler, McpRequest, McpResponse, ToolCallResult,
};
use crate::error::SyliusError;

/// Serves `initialize`, `tools/list` and `tools/call`
#[derive(Clone)]
pub struct JsonRpcHandler {
    dispatcher: Arc<Dispatcher>,
}

impl JsonRpcHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn call_tool(&self, id: Option<Value>, params: &Value) -> McpResponse {
        let name = match params.get("name").and_then(Value::as_str) {
            Some(name) => name,
            None => {
                return McpResponse::from_error(id, SyliusError::MissingArgument("name".into()))
            }
        };
        let arguments = params.get("arguments").unwrap_or(&Value::Null);

        match self.dispatcher.dispatch(name, arguments) {
            Ok(output) => McpResponse::success(id, json!(ToolCallResult::text(output.to_text()))),
            Err(e) => McpResponse::from_error(id, e),
        }
    }
}

impl McpHandler for JsonRpcHandler {
    fn handle_request(&self, request: McpRequest) -> McpResponse {
        match request.method.as_str() {
            methods::INITIALIZE => {
                McpResponse::success(request.id, json!(InitializeResult::default()))
            }
            methods::INITIALIZED => McpResponse::success(request.id, json!({})),
            methods::LIST_TOOLS => {
                let tools = self.dispatcher.registry().definitions();
                McpResponse::success(request.id, json!({ "tools": tools }))
            }
            methods::CALL_TOOL => self.call_tool(request.id, &request.params),
            other => {
                tracing::debug!(method = other, "unsupported JSON-RPC method");
                McpResponse::from_error(request.id, SyliusError::UnknownMethod(other.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::{seed_demo_catalog, Storage};

    fn handler() -> JsonRpcHandler {
        let storage = Storage::open_in_memory().unwrap();
        seed_demo_catalog(&storage).unwrap();
        JsonRpcHandler::new(Arc::new(Dispatcher::new(Catalog::new(storage))))
    }

    fn call(handler: &JsonRpcHandler, params: Value) -> McpResponse {
        handler.handle_request(McpRequest::new(7, methods::CALL_TOOL, params))
    }

    fn text_of(response: &McpResponse) -> String {
        response.result.as_ref().unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_tools_list() {
        let response =
            handler().handle_request(McpRequest::new(1, methods::LIST_TOOLS, Value::Null));
        let result = response.result.unwrap();
        let tools = &result["tools"];
        assert_eq!(tools.as_array().unwrap().len(), 5);
        assert_eq!(tools[3]["inputSchema"]["required"], json!(["code"]));
    }

    #[test]
    fn test_call_hello_world() {
        let response = call(&handler(), json!({"name": "hello_world"}));
        assert_eq!(response.id, Some(json!(7)));
        assert_eq!(text_of(&response), "Hello, World!");
    }

    #[test]
    fn test_error_codes() {
        let h = handler();
        let unknown = call(&h, json!({"name": "nope", "arguments": {}}));
        assert_eq!(unknown.error.unwrap().code, -32601);

        let missing = call(&h, json!({"name": "search_sylius_products", "arguments": {}}));
        let error = missing.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("query"));

        let no_name = call(&h, json!({"arguments": {}}));
        assert_eq!(no_name.error.unwrap().code, -32602);

        let method = h.handle_request(McpRequest::new(2, "resources/list", Value::Null));
        assert_eq!(method.error.unwrap().code, -32601);
    }

    #[test]
    fn test_not_found_is_success_text() {
        let response = call(
            &handler(),
            json!({"name": "get_sylius_product_by_code", "arguments": {"code": "DOES_NOT_EXIST"}}),
        );
        assert!(response.error.is_none());
        assert_eq!(text_of(&response), "Product with code 'DOES_NOT_EXIST' not found");
    }

    #[test]
    fn test_products_are_stringified_json() {
        let response = call(
            &handler(),
            json!({"name": "get_sylius_products", "arguments": {"limit": 2}}),
        );
        let parsed: Value = serde_json::from_str(&text_of(&response)).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_initialize() {
        let response =
            handler().handle_request(McpRequest::new(0, methods::INITIALIZE, json!({})));
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "sylius-mcp");
    }
}
