//! Transport-neutral tool dispatch
//!
//! Lookup, required-argument check, type check, defaulting, invocation.
//! Every failure leaves as one of `UnknownTool`, `MissingArgument`,
//! `InvalidArgument` or `ToolExecution`; nothing else reaches a transport.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use serde_json::{Map, Value};

use super::tools::{
    Tool, ToolArgs, ToolContext, ToolDescriptor, ToolOutput, ToolRegistry, TOOL_REGISTRY,
};
use crate::catalog::Catalog;
use crate::error::{Result, SyliusError};

/// Routes tool calls to their handlers
pub struct Dispatcher {
    registry: &'static ToolRegistry,
    context: ToolContext,
}

impl Dispatcher {
    /// Dispatcher over the built-in tools
    pub fn new(catalog: Catalog) -> Self {
        Self::with_registry(&TOOL_REGISTRY, catalog)
    }

    pub fn with_registry(registry: &'static ToolRegistry, catalog: Catalog) -> Self {
        Self {
            registry,
            context: ToolContext { catalog },
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.registry
    }

    /// Call `name` with the raw argument object.
    ///
    /// `arguments` may be `null` (no arguments) or an object.
    pub fn dispatch(&self, name: &str, arguments: &Value) -> Result<ToolOutput> {
        tracing::debug!(tool = name, "dispatching tool call");

        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| SyliusError::UnknownTool(name.to_string()))?;

        let empty = Map::new();
        let supplied = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(SyliusError::InvalidArgument {
                    name: "arguments".to_string(),
                    expected: "object".to_string(),
                })
            }
        };

        let args = resolve_arguments(&tool.descriptor, supplied)?;
        let result = invoke(tool, &self.context, &args);
        if let Err(ref e) = result {
            tracing::warn!(tool = name, error = %e, "tool call failed");
        }
        result
    }
}

/// Validate `supplied` against the descriptor and fill in defaults.
/// Undeclared arguments are dropped.
pub fn resolve_arguments(
    descriptor: &ToolDescriptor,
    supplied: &Map<String, Value>,
) -> Result<ToolArgs> {
    let mut resolved = Map::new();

    for spec in descriptor.args {
        let value = supplied.get(spec.name).filter(|v| !v.is_null());

        match value {
            Some(Value::String(s)) if spec.required && s.is_empty() => {
                return Err(SyliusError::MissingArgument(spec.name.to_string()));
            }
            Some(v) => {
                if !spec.arg_type.accepts(v) {
                    return Err(SyliusError::InvalidArgument {
                        name: spec.name.to_string(),
                        expected: spec.arg_type.as_str().to_string(),
                    });
                }
                resolved.insert(spec.name.to_string(), v.clone());
            }
            None if spec.required => {
                return Err(SyliusError::MissingArgument(spec.name.to_string()));
            }
            None => {
                if let Some(default) = spec.default {
                    resolved.insert(spec.name.to_string(), default.to_value());
                }
            }
        }
    }

    Ok(ToolArgs::new(resolved))
}

fn invoke(tool: &Tool, context: &ToolContext, args: &ToolArgs) -> Result<ToolOutput> {
    let outcome = catch_unwind(AssertUnwindSafe(|| (tool.handler)(context, args)));
    match outcome {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e @ SyliusError::ToolExecution(_))) => Err(e),
        Ok(Err(e)) => Err(SyliusError::ToolExecution(e.to_string())),
        Err(_) => Err(SyliusError::ToolExecution(format!(
            "tool '{}' panicked",
            tool.descriptor.name
        ))),
    }
}

/// Serializable `{ok, value}` / `{ok, error: {kind, message}}` envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeError {
    pub kind: String,
    pub message: String,
}

impl From<Result<ToolOutput>> for Envelope {
    fn from(result: Result<ToolOutput>) -> Self {
        match result {
            Ok(output) => Envelope {
                ok: true,
                value: Some(output.into_value()),
                error: None,
            },
            Err(e) => Envelope {
                ok: false,
                value: None,
                error: Some(EnvelopeError {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }),
            },
        }
    }
}
