//! MCP Server Core
//!
//! Handles the main MCP server logic, routing requests to the Tool
//! Contract surface (spec.md §6.1) and the memory:// resources.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::protocol::messages::{
    CallToolRequest, CallToolResult, InitializeRequest, InitializeResult, ListResourcesResult,
    ListToolsResult, ReadResourceRequest, ReadResourceResult, ResourceContent, ResourceDescription,
    ServerCapabilities, ServerInfo, ToolDescription,
};
use crate::protocol::types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_VERSION};
use crate::resources;
use crate::tools;
use sdd_memory_core::{GraphEngine, QueryEngine, SessionLifecycle, Storage};

/// MCP Server implementation: one engine handle per subsystem, sharing
/// the same underlying `Storage`.
pub struct McpServer {
    storage: Arc<Storage>,
    query: QueryEngine,
    graph: GraphEngine,
    sessions: SessionLifecycle,
    initialized: bool,
}

impl McpServer {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            query: QueryEngine::new(storage.clone()),
            graph: GraphEngine::new(storage.clone()),
            sessions: SessionLifecycle::new(storage.clone()),
            storage,
            initialized: false,
        }
    }

    /// Handle an incoming JSON-RPC request
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("Handling request: {}", request.method);

        if !self.initialized && request.method != "initialize" && request.method != "notifications/initialized" {
            warn!("Rejecting request '{}': server not initialized", request.method);
            return Some(JsonRpcResponse::error(request.id, JsonRpcError::server_not_initialized()));
        }

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "notifications/initialized" => return None,
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params),
            "resources/list" => self.handle_resources_list(),
            "resources/read" => self.handle_resources_read(request.params),
            "ping" => Ok(serde_json::json!({})),
            method => {
                warn!("Unknown method: {}", method);
                Err(JsonRpcError::method_not_found())
            }
        };

        Some(match result {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(error) => JsonRpcResponse::error(request.id, error),
        })
    }

    fn handle_initialize(&mut self, params: Option<serde_json::Value>) -> Result<serde_json::Value, JsonRpcError> {
        let request: InitializeRequest = match params {
            Some(p) => serde_json::from_value(p).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))?,
            None => InitializeRequest::default(),
        };

        // Version negotiation: use the client's version if it's older than
        // ours, since some clients reject servers reporting a newer one.
        let negotiated_version = if request.protocol_version.as_str() < MCP_VERSION {
            info!("Client requested older protocol version {}, using it", request.protocol_version);
            request.protocol_version.clone()
        } else {
            MCP_VERSION.to_string()
        };

        self.initialized = true;
        info!("MCP session initialized with protocol version {}", negotiated_version);

        let result = InitializeResult {
            protocol_version: negotiated_version,
            server_info: ServerInfo {
                name: "sdd-memory".to_string(),
                version: sdd_memory_core::VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some({
                    let mut map = HashMap::new();
                    map.insert("listChanged".to_string(), serde_json::json!(false));
                    map
                }),
                resources: Some({
                    let mut map = HashMap::new();
                    map.insert("listChanged".to_string(), serde_json::json!(false));
                    map
                }),
                prompts: None,
            },
            instructions: Some(
                "This server is persistent cross-session memory for a spec-driven-development \
                 assistant. Use `save` to record decisions, architecture notes, bug fixes, and \
                 other observations; `save_prompt` to capture the user's verbatim asks; `search` \
                 and `context` to read them back; `relate`/`build_context` to traverse how \
                 observations connect; `progress` as a per-project scratchpad. Save a topic_key \
                 when an observation should overwrite its own prior revision rather than \
                 accumulate duplicates."
                    .to_string(),
            ),
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
    }

    fn handle_tools_list(&self) -> Result<serde_json::Value, JsonRpcError> {
        let tools = vec![
            ToolDescription {
                name: "save".to_string(),
                description: Some("Record an observation (decision, architecture note, bugfix, pattern, config, discovery, learning). Provide topic_key to upsert in place of accumulating duplicates.".to_string()),
                input_schema: tools::save::schema(),
            },
            ToolDescription {
                name: "save_prompt".to_string(),
                description: Some("Capture the user's verbatim request, separate from the observations it produces.".to_string()),
                input_schema: tools::save_prompt::schema(),
            },
            ToolDescription {
                name: "search".to_string(),
                description: Some("Full-text search over observations, budget-shaped to a token limit.".to_string()),
                input_schema: tools::search::schema(),
            },
            ToolDescription {
                name: "context".to_string(),
                description: Some("Most recent observations matching structured filters, no text query.".to_string()),
                input_schema: tools::context::schema(),
            },
            ToolDescription {
                name: "timeline".to_string(),
                description: Some("Observations chronologically near an anchor observation, within a time window.".to_string()),
                input_schema: tools::timeline::schema(),
            },
            ToolDescription {
                name: "get_observation".to_string(),
                description: Some("Fetch a single observation by id at full detail.".to_string()),
                input_schema: tools::get_observation::schema(),
            },
            ToolDescription {
                name: "delete".to_string(),
                description: Some("Soft-delete an observation by default (preserves relations); pass hard=true to remove it and cascade relation deletion.".to_string()),
                input_schema: tools::delete::schema(),
            },
            ToolDescription {
                name: "update".to_string(),
                description: Some("Partially update an existing observation. project/topic_key accept null to clear them.".to_string()),
                input_schema: tools::update::schema(),
            },
            ToolDescription {
                name: "suggest_topic_key".to_string(),
                description: Some("Derive the canonical topic_key `save` would need to target the same upsert slot.".to_string()),
                input_schema: tools::suggest_topic_key::schema(),
            },
            ToolDescription {
                name: "stats".to_string(),
                description: Some("Store-wide counts and breakdowns by type, project, and scope.".to_string()),
                input_schema: tools::stats::schema(),
            },
            ToolDescription {
                name: "compact".to_string(),
                description: Some("List stale-observation candidates (omit ids), or soft-delete a chosen set and fold them into one summary observation (pass ids).".to_string()),
                input_schema: tools::compact::schema(),
            },
            ToolDescription {
                name: "progress".to_string(),
                description: Some("Read or write the per-project progress document. Omit content to read, provide it to write.".to_string()),
                input_schema: tools::progress::schema(),
            },
            ToolDescription {
                name: "relate".to_string(),
                description: Some("Create a typed directed relation between two observations.".to_string()),
                input_schema: tools::relate::schema(),
            },
            ToolDescription {
                name: "unrelate".to_string(),
                description: Some("Remove a relation by id.".to_string()),
                input_schema: tools::unrelate::schema(),
            },
            ToolDescription {
                name: "build_context".to_string(),
                description: Some("Breadth-first traversal of the relation graph around a root observation.".to_string()),
                input_schema: tools::build_context::schema(),
            },
            ToolDescription {
                name: "session_start".to_string(),
                description: Some("Start a new session, optionally scoped to a project and workspace.".to_string()),
                input_schema: tools::session::start_schema(),
            },
            ToolDescription {
                name: "session_end".to_string(),
                description: Some("End a session by id.".to_string()),
                input_schema: tools::session::end_schema(),
            },
            ToolDescription {
                name: "session_summary".to_string(),
                description: Some("Record a closing summary for a session, also saved as an observation.".to_string()),
                input_schema: tools::session::summary_schema(),
            },
        ];

        let result = ListToolsResult { tools };
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
    }

    fn handle_tools_call(&self, params: Option<serde_json::Value>) -> Result<serde_json::Value, JsonRpcError> {
        let request: CallToolRequest = match params {
            Some(p) => serde_json::from_value(p).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))?,
            None => return Err(JsonRpcError::invalid_params("Missing tool call parameters")),
        };

        let result: Result<String, String> = match request.name.as_str() {
            "save" => tools::save::execute(&self.storage, request.arguments),
            "save_prompt" => tools::save_prompt::execute(&self.storage, request.arguments),
            "search" => tools::search::execute(&self.query, request.arguments),
            "context" => tools::context::execute(&self.query, request.arguments),
            "timeline" => tools::timeline::execute(&self.query, request.arguments),
            "get_observation" => tools::get_observation::execute(&self.storage, &self.graph, request.arguments),
            "delete" => tools::delete::execute(&self.storage, request.arguments),
            "update" => tools::update::execute(&self.storage, request.arguments),
            "suggest_topic_key" => tools::suggest_topic_key::execute(request.arguments),
            "stats" => tools::stats::execute(&self.query, request.arguments),
            "compact" => tools::compact::execute(&self.query, request.arguments),
            "progress" => tools::progress::execute(&self.storage, request.arguments),
            "relate" => tools::relate::execute(&self.graph, request.arguments),
            "unrelate" => tools::unrelate::execute(&self.graph, request.arguments),
            "build_context" => tools::build_context::execute(&self.graph, request.arguments),
            "session_start" => tools::session::start(&self.sessions, request.arguments),
            "session_end" => tools::session::end(&self.sessions, request.arguments),
            "session_summary" => tools::session::summary(&self.sessions, request.arguments),
            name => return Err(JsonRpcError::method_not_found_with_message(&format!("Unknown tool: {name}"))),
        };

        let call_result = match result {
            Ok(text) => CallToolResult::ok(text),
            Err(message) => CallToolResult::error(message),
        };
        serde_json::to_value(call_result).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
    }

    fn handle_resources_list(&self) -> Result<serde_json::Value, JsonRpcError> {
        let resources = vec![
            ResourceDescription {
                uri: "memory://stats".to_string(),
                name: "Memory Statistics".to_string(),
                description: Some("Store-wide counts and breakdowns.".to_string()),
                mime_type: Some("text/plain".to_string()),
            },
            ResourceDescription {
                uri: "memory://recent".to_string(),
                name: "Recent Observations".to_string(),
                description: Some("The 20 most recently written observations.".to_string()),
                mime_type: Some("text/plain".to_string()),
            },
        ];

        let result = ListResourcesResult { resources };
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
    }

    fn handle_resources_read(&self, params: Option<serde_json::Value>) -> Result<serde_json::Value, JsonRpcError> {
        let request: ReadResourceRequest = match params {
            Some(p) => serde_json::from_value(p).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))?,
            None => return Err(JsonRpcError::invalid_params("Missing resource URI")),
        };

        let content = resources::memory::read(&self.query, &request.uri);

        match content {
            Ok(text) => {
                let result = ReadResourceResult {
                    contents: vec![ResourceContent { uri: request.uri, mime_type: "text/plain".to_string(), text }],
                };
                serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
            }
            Err(e) => Err(JsonRpcError::resource_not_found(&e)),
        }
    }
}
