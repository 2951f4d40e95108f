//! End-to-end journey driving the MCP server's JSON-RPC surface the way
//! a real client would: initialize, save, relate, and read back through
//! `build_context`/`get_observation` (spec.md §6.1).

use sdd_memory_core::{Storage, StoreConfig};
use sdd_memory_mcp::protocol::types::JsonRpcRequest;
use sdd_memory_mcp::McpServer;
use std::sync::Arc;

fn request(method: &str, params: Option<serde_json::Value>) -> JsonRpcRequest {
    JsonRpcRequest { jsonrpc: "2.0".to_string(), id: Some(serde_json::json!(1)), method: method.to_string(), params }
}

async fn initialized_server() -> (McpServer, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = Arc::new(Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap());
    let mut server = McpServer::new(storage);
    server.handle_request(request("initialize", None)).await;
    (server, dir)
}

fn tool_text(response: &sdd_memory_mcp::protocol::types::JsonRpcResponse) -> String {
    response.result.as_ref().unwrap()["content"][0]["text"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn save_relate_and_build_context_round_trip_over_json_rpc() {
    let (mut server, _dir) = initialized_server().await;

    let save_a = server
        .handle_request(request(
            "tools/call",
            Some(serde_json::json!({"name": "save", "arguments": {"type": "decision", "title": "Pick a datastore", "content": "SQLite"}})),
        ))
        .await
        .unwrap();
    let text_a = tool_text(&save_a);
    let id_a: i64 = text_a.split('#').nth(1).unwrap().split_whitespace().next().unwrap().parse().unwrap();

    let save_b = server
        .handle_request(request(
            "tools/call",
            Some(serde_json::json!({"name": "save", "arguments": {"type": "architecture", "title": "Storage layer", "content": "embedded"}})),
        ))
        .await
        .unwrap();
    let text_b = tool_text(&save_b);
    let id_b: i64 = text_b.split('#').nth(1).unwrap().split_whitespace().next().unwrap().parse().unwrap();

    let relate = server
        .handle_request(request(
            "tools/call",
            Some(serde_json::json!({"name": "relate", "arguments": {"from_id": id_a, "to_id": id_b, "relation_type": "implements"}})),
        ))
        .await
        .unwrap();
    assert_eq!(relate.result.unwrap()["isError"], false);

    let built = server
        .handle_request(request(
            "tools/call",
            Some(serde_json::json!({"name": "build_context", "arguments": {"observation_id": id_a, "depth": 2}})),
        ))
        .await
        .unwrap();
    let built_text = tool_text(&built);
    assert!(built_text.contains("1 connected node"), "build_context should report one connected node: {built_text}");

    let fetched = server
        .handle_request(request("tools/call", Some(serde_json::json!({"name": "get_observation", "arguments": {"id": id_a}}))))
        .await
        .unwrap();
    let fetched_text = tool_text(&fetched);
    assert!(fetched_text.contains("Relations:"));
    assert!(fetched_text.contains("Outgoing:"));
}

#[tokio::test]
async fn tools_list_matches_the_eighteen_tool_contract_surface() {
    let (mut server, _dir) = initialized_server().await;
    let response = server.handle_request(request("tools/list", None)).await.unwrap();
    let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 18);
}

#[tokio::test]
async fn memory_stats_resource_reflects_saved_observations() {
    let (mut server, _dir) = initialized_server().await;
    server
        .handle_request(request(
            "tools/call",
            Some(serde_json::json!({"name": "save", "arguments": {"type": "discovery", "title": "A finding", "content": "noted"}})),
        ))
        .await;

    let response = server.handle_request(request("resources/read", Some(serde_json::json!({"uri": "memory://stats"})))).await.unwrap();
    let text = response.result.unwrap()["contents"][0]["text"].as_str().unwrap().to_string();
    assert!(text.contains("liveObservations") || text.contains("live_observations"));
}
