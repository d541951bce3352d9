//! Tool System
//!
//! Tools are registered once at startup and invoked by the tool-call loop
//! whenever a provider asks for them. The registry is read-only after
//! initialization and shared by reference across conversations.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{ChatError, Result};

/// Named tool arguments as sent by the provider
pub type ToolArgs = Map<String, Value>;

/// Parameter definition for a tool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// JSON Schema type (string, number, integer, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            description: description.into(),
            required: false,
        }
    }
}

/// Tool definition (for provider function calling)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Parameter definitions keyed by name
    #[serde(default)]
    pub params: BTreeMap<String, ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.params.insert(name.into(), spec);
        self
    }

    /// JSON Schema object describing the parameters.
    ///
    /// Every adapter embeds this in its own declaration envelope
    /// (`input_schema`, `function.parameters`, `functionDeclarations[].parameters`).
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    json!({ "type": spec.param_type, "description": spec.description }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A tool invocation requested by the provider
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// Provider-assigned correlation id
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub args: ToolArgs,
}

impl ToolInvocationRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: ToolArgs) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }
}

/// Result of one tool invocation, matched to its request by `id`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    /// Correlation id copied from the request
    pub id: String,

    /// Tool that was called
    pub name: String,

    /// Serialized payload (JSON by convention)
    pub payload: String,

    /// Whether execution succeeded
    pub success: bool,
}

impl ToolInvocationResult {
    pub fn success(request: &ToolInvocationRequest, payload: impl Into<String>) -> Self {
        Self {
            id: request.id.clone(),
            name: request.name.clone(),
            payload: payload.into(),
            success: true,
        }
    }

    pub fn failure(request: &ToolInvocationRequest, payload: impl Into<String>) -> Self {
        Self {
            id: request.id.clone(),
            name: request.name.clone(),
            payload: payload.into(),
            success: false,
        }
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's descriptor
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with given arguments
    async fn call(&self, args: &ToolArgs) -> Result<Value>;

    /// Validate arguments before execution
    fn validate(&self, args: &ToolArgs) -> Result<()> {
        let descriptor = self.descriptor();

        for (name, spec) in &descriptor.params {
            let present = args.get(name).is_some_and(|v| !v.is_null());
            if spec.required && !present {
                return Err(ChatError::ToolValidation(format!(
                    "Missing required parameter: {name}"
                )));
            }
        }

        Ok(())
    }
}

type Handler = Box<dyn Fn(ToolArgs) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Tool backed by a closure
struct FnTool {
    descriptor: ToolDescriptor,
    handler: Handler,
}

#[async_trait]
impl Tool for FnTool {
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    async fn call(&self, args: &ToolArgs) -> Result<Value> {
        (self.handler)(args.clone()).await
    }
}

/// Registry for available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.descriptor().name;
        if self.tools.contains_key(&name) {
            return Err(ChatError::DuplicateTool(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Register a closure as a tool handler
    pub fn register_fn<F, Fut>(&mut self, descriptor: ToolDescriptor, handler: F) -> Result<()>
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.register(FnTool {
            descriptor,
            handler: Box::new(move |args| handler(args).boxed()),
        })
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ChatError::UnknownTool(name.to_string()))
    }

    /// All descriptors, sorted by name
    pub fn describe_all(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> =
            self.tools.values().map(|t| t.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Get tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
