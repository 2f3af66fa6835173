//! Tool registry
//!
//! The fixed set of callable tools. Each entry pairs a transport-neutral
//! descriptor with its handler; both transports project the descriptor into
//! their own listing shape.

use chrono::Local;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::protocol::ToolDefinition;
use crate::catalog::Catalog;
use crate::error::{Result, SyliusError};

/// Primitive argument types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    Integer,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Integer => "integer",
        }
    }

    /// Whether `value` has this JSON type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ArgType::String => value.is_string(),
            ArgType::Integer => value.as_i64().is_some(),
        }
    }
}

/// Default for an optional argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgDefault {
    Str(&'static str),
    Int(i64),
}

impl ArgDefault {
    pub fn to_value(self) -> Value {
        match self {
            ArgDefault::Str(s) => Value::from(s),
            ArgDefault::Int(i) => Value::from(i),
        }
    }
}

/// Declared argument of a tool
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub arg_type: ArgType,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<ArgDefault>,
}

impl ArgSpec {
    const fn required(name: &'static str, arg_type: ArgType, description: &'static str) -> Self {
        Self {
            name,
            arg_type,
            description,
            required: true,
            default: None,
        }
    }

    const fn optional(
        name: &'static str,
        arg_type: ArgType,
        description: &'static str,
        default: ArgDefault,
    ) -> Self {
        Self {
            name,
            arg_type,
            description,
            required: false,
            default: Some(default),
        }
    }
}

/// Name, description and arguments of a tool
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgSpec],
}

impl ToolDescriptor {
    /// JSON-Schema object describing the arguments
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for arg in self.args {
            let mut property = json!({
                "type": arg.arg_type.as_str(),
                "description": arg.description,
            });
            if let Some(default) = arg.default {
                property["default"] = default.to_value();
            }
            properties.insert(arg.name.to_string(), property);
        }

        let mut schema = json!({"type": "object", "properties": properties});
        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name)
            .collect();
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Descriptor as listed by JSON-RPC `tools/list`
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }

    /// Descriptor as listed by REST `GET /tools`
    pub fn to_rest_descriptor(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.input_schema(),
        })
    }
}

/// Value produced by a tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    Json(Value),
    /// Successful lookup that matched nothing; carries the user-facing message
    NotFound(String),
}

impl ToolOutput {
    /// Text rendering used inside JSON-RPC content blocks
    pub fn to_text(&self) -> String {
        match self {
            ToolOutput::Text(text) | ToolOutput::NotFound(text) => text.clone(),
            ToolOutput::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    /// Structured rendering used by the REST surface
    pub fn into_value(self) -> Value {
        match self {
            ToolOutput::Text(text) | ToolOutput::NotFound(text) => Value::String(text),
            ToolOutput::Json(value) => value,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ToolOutput::NotFound(_))
    }
}

/// Arguments after validation and defaulting
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| SyliusError::InvalidArgument {
                name: name.to_string(),
                expected: ArgType::String.as_str().to_string(),
            })
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        self.values
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| SyliusError::InvalidArgument {
                name: name.to_string(),
                expected: ArgType::Integer.as_str().to_string(),
            })
    }
}

/// Collaborators available to tool handlers
#[derive(Clone)]
pub struct ToolContext {
    pub catalog: Catalog,
}

pub type ToolHandler = fn(&ToolContext, &ToolArgs) -> Result<ToolOutput>;

/// A registry entry
pub struct Tool {
    pub descriptor: ToolDescriptor,
    pub handler: ToolHandler,
}

/// Ordered name → tool mapping
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Tool>) -> Self {
        Self { tools }
    }

    /// The built-in tool set
    pub fn builtin() -> Self {
        Self::new(vec![
            Tool {
                descriptor: HELLO_WORLD,
                handler: hello_world,
            },
            Tool {
                descriptor: GET_CURRENT_TIME,
                handler: get_current_time,
            },
            Tool {
                descriptor: GET_PRODUCTS,
                handler: get_sylius_products,
            },
            Tool {
                descriptor: GET_PRODUCT_BY_CODE,
                handler: get_sylius_product_by_code,
            },
            Tool {
                descriptor: SEARCH_PRODUCTS,
                handler: search_sylius_products,
            },
        ])
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.descriptor.name == name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.descriptors().map(ToolDescriptor::to_definition).collect()
    }

    pub fn rest_descriptors(&self) -> Vec<Value> {
        self.descriptors()
            .map(ToolDescriptor::to_rest_descriptor)
            .collect()
    }
}

/// Process-wide registry of built-in tools
pub static TOOL_REGISTRY: Lazy<ToolRegistry> = Lazy::new(ToolRegistry::builtin);

const LIMIT_DESCRIPTION: &str = "Maximum number of products to return";

pub const HELLO_WORLD: ToolDescriptor = ToolDescriptor {
    name: "hello_world",
    description: "Say hello to someone",
    args: &[ArgSpec::optional(
        "name",
        ArgType::String,
        "Name to greet",
        ArgDefault::Str("World"),
    )],
};

pub const GET_CURRENT_TIME: ToolDescriptor = ToolDescriptor {
    name: "get_current_time",
    description: "Get the current time",
    args: &[],
};

pub const GET_PRODUCTS: ToolDescriptor = ToolDescriptor {
    name: "get_sylius_products",
    description: "Get products from Sylius e-commerce platform",
    args: &[
        ArgSpec::optional("limit", ArgType::Integer, LIMIT_DESCRIPTION, ArgDefault::Int(10)),
        ArgSpec::optional(
            "offset",
            ArgType::Integer,
            "Number of products to skip",
            ArgDefault::Int(0),
        ),
    ],
};

pub const GET_PRODUCT_BY_CODE: ToolDescriptor = ToolDescriptor {
    name: "get_sylius_product_by_code",
    description: "Get a specific product by its code from Sylius",
    args: &[ArgSpec::required(
        "code",
        ArgType::String,
        "Product code to search for",
    )],
};

pub const SEARCH_PRODUCTS: ToolDescriptor = ToolDescriptor {
    name: "search_sylius_products",
    description: "Search products by name or description in Sylius",
    args: &[
        ArgSpec::required("query", ArgType::String, "Search query"),
        ArgSpec::optional("limit", ArgType::Integer, LIMIT_DESCRIPTION, ArgDefault::Int(10)),
    ],
};

/// Timestamp layout returned by `get_current_time`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn hello_world(_ctx: &ToolContext, args: &ToolArgs) -> Result<ToolOutput> {
    Ok(ToolOutput::Text(format!("Hello, {}!", args.str("name")?)))
}

fn get_current_time(_ctx: &ToolContext, _args: &ToolArgs) -> Result<ToolOutput> {
    Ok(ToolOutput::Text(Local::now().format(TIME_FORMAT).to_string()))
}

fn get_sylius_products(ctx: &ToolContext, args: &ToolArgs) -> Result<ToolOutput> {
    let products = ctx
        .catalog
        .list_products(args.int("limit")?, args.int("offset")?);
    Ok(ToolOutput::Json(serde_json::to_value(products)?))
}

fn get_sylius_product_by_code(ctx: &ToolContext, args: &ToolArgs) -> Result<ToolOutput> {
    let code = args.str("code")?;
    match ctx.catalog.get_product_by_code(code) {
        Some(product) => Ok(ToolOutput::Json(serde_json::to_value(product)?)),
        None => Ok(ToolOutput::NotFound(format!(
            "Product with code '{}' not found",
            code
        ))),
    }
}

fn search_sylius_products(ctx: &ToolContext, args: &ToolArgs) -> Result<ToolOutput> {
    let products = ctx
        .catalog
        .search_products(args.str("query")?, args.int("limit")?);
    Ok(ToolOutput::Json(serde_json::to_value(products)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_order_and_lookup() {
        let names: Vec<_> = TOOL_REGISTRY.descriptors().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "hello_world",
                "get_current_time",
                "get_sylius_products",
                "get_sylius_product_by_code",
                "search_sylius_products",
            ]
        );
        assert!(TOOL_REGISTRY.get("search_sylius_products").is_some());
        assert!(TOOL_REGISTRY.get("drop_tables").is_none());
    }

    #[test]
    fn test_input_schema_shape() {
        assert_eq!(
            SEARCH_PRODUCTS.input_schema(),
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"},
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of products to return",
                        "default": 10
                    }
                },
                "required": ["query"]
            })
        );
        assert_eq!(
            GET_CURRENT_TIME.input_schema(),
            json!({"type": "object", "properties": {}})
        );
    }

    #[test]
    fn test_both_listings_share_schema() {
        let definition = GET_PRODUCTS.to_definition();
        let rest = GET_PRODUCTS.to_rest_descriptor();
        assert_eq!(rest["parameters"], definition.input_schema);
        assert_eq!(rest["name"], "get_sylius_products");
    }

    #[test]
    fn test_arg_type_accepts() {
        assert!(ArgType::Integer.accepts(&json!(3)));
        assert!(ArgType::Integer.accepts(&json!(-3)));
        assert!(!ArgType::Integer.accepts(&json!(3.5)));
        assert!(!ArgType::Integer.accepts(&json!("3")));
        assert!(ArgType::String.accepts(&json!("")));
        assert!(!ArgType::String.accepts(&json!(1)));
    }

    #[test]
    fn test_tool_output_renderings() {
        let json_output = ToolOutput::Json(json!([{"code": "A"}]));
        assert!(json_output.to_text().contains("\"code\": \"A\""));
        assert_eq!(json_output.into_value(), json!([{"code": "A"}]));

        let missing = ToolOutput::NotFound("Product with code 'X' not found".into());
        assert!(missing.is_not_found());
        assert_eq!(missing.to_text(), "Product with code 'X' not found");
    }
}
