use crate::doubles::ScriptedRunner;
use serde_json::{Value, json};
use std::sync::Arc;
use sysops_agent::dispatch::{CommandOutput, DispatchSettings, Dispatcher};
use sysops_agent::mcp::McpServer;
use sysops_agent::mcp::protocol::{
    INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};

fn server_with(runner: Arc<ScriptedRunner>, auto_approve: bool) -> McpServer {
    McpServer::new(
        Dispatcher::new(runner, DispatchSettings::default()),
        auto_approve,
    )
}

fn server() -> McpServer {
    server_with(Arc::new(ScriptedRunner::new()), false)
}

async fn request(server: &McpServer, message: Value) -> Value {
    let response = server
        .handle(&message.to_string())
        .await
        .expect("requests with an id get a response");
    serde_json::to_value(response).unwrap()
}

fn call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

#[tokio::test]
async fn initialize_reports_protocol_and_tools_capability() {
    let response = request(
        &server(),
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;

    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
    assert!(response["result"]["capabilities"]["tools"].is_object());
    assert_eq!(response["result"]["serverInfo"]["name"], "sysops-agent");
}

#[tokio::test]
async fn tools_list_exposes_every_family() {
    let response = request(
        &server(),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await;

    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect();
    for family in [
        "run_command",
        "read_path",
        "write_path",
        "compositor_config",
        "status_bar",
        "network_admin",
        "service_admin",
        "cluster_admin",
        "resource_status",
    ] {
        assert!(names.contains(&family), "missing {family} in {names:?}");
    }
}

#[tokio::test]
async fn tools_call_dispatches_and_returns_the_envelope() {
    let runner = Arc::new(
        ScriptedRunner::new().on("kubectl get namespaces", CommandOutput::ok("default Active\n")),
    );
    let response = request(
        &server_with(runner.clone(), false),
        call(3, "cluster_admin", json!({"action": "namespaces"})),
    )
    .await;

    let result = &response["result"];
    assert_eq!(result["isError"], false);
    let envelope: Value =
        serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["fields"]["output"], "default Active\n");
    assert_eq!(runner.calls(), vec!["kubectl get namespaces".to_string()]);
}

#[tokio::test]
async fn failing_command_is_flagged_as_error() {
    let runner = Arc::new(ScriptedRunner::new().on(
        "systemctl restart nope",
        CommandOutput::exit(5, "Unit nope.service not found."),
    ));
    let response = request(
        &server_with(runner, false),
        call(4, "service_admin", json!({"action": "restart", "service": "nope"})),
    )
    .await;

    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("not found"), "{text}");
}

#[tokio::test]
async fn write_is_denied_without_auto_approve() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.txt");
    let arguments = json!({"path": target.display().to_string(), "content": "x"});

    let response = request(&server(), call(5, "write_path", arguments.clone())).await;
    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("requires confirmation"), "{text}");
    assert!(!target.exists());

    let approving = server_with(Arc::new(ScriptedRunner::new()), true);
    let response = request(&approving, call(6, "write_path", arguments)).await;
    assert_eq!(response["result"]["isError"], false);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "x");
}

#[tokio::test]
async fn invalid_tool_arguments_are_reported_in_band() {
    let response = request(&server(), call(7, "service_admin", json!({"action": "status"}))).await;

    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("invalid action:"), "{text}");
}

#[tokio::test]
async fn non_object_arguments_are_invalid_params() {
    let response = request(&server(), call(8, "run_command", json!("uptime"))).await;
    assert_eq!(response["error"]["code"], INVALID_PARAMS);
}

#[tokio::test]
async fn notifications_get_no_response() {
    let server = server();
    let response = server
        .handle(r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#)
        .await;
    assert!(response.is_none());
}

#[tokio::test]
async fn unknown_method_and_garbage_are_errors() {
    let server = server();
    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 9, "method": "resources/list"}),
    )
    .await;
    assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

    let garbage = server.handle("{not json").await.unwrap();
    let garbage = serde_json::to_value(garbage).unwrap();
    assert_eq!(garbage["error"]["code"], PARSE_ERROR);
    assert!(garbage["id"].is_null());
}

#[tokio::test]
async fn serve_answers_line_by_line() {
    let input = concat!(
        r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#,
        "\n",
        r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#,
        "\n",
        "\n",
        r#"{"jsonrpc": "2.0", "id": 2, "method": "ping"}"#,
        "\n",
    );
    let mut output = Vec::new();

    server()
        .serve(input.as_bytes(), &mut output)
        .await
        .unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[1]["id"], 2);
    assert_eq!(lines[1]["result"], json!({}));
}

#[tokio::test]
async fn non_utf8_line_gets_a_parse_error_and_serving_continues() {
    let mut input = b"\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(br#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#);
    input.push(b'\n');
    let mut output = Vec::new();

    server().serve(input.as_slice(), &mut output).await.unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["error"]["code"], PARSE_ERROR);
    assert!(lines[0]["id"].is_null());
    assert_eq!(lines[1]["id"], 7);
    assert_eq!(lines[1]["result"], json!({}));
}

#[tokio::test]
async fn explicit_null_id_is_answered() {
    let response = server()
        .handle(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
        .await
        .expect("a null id is a request, not a notification");
    let response = serde_json::to_value(response).unwrap();
    assert!(response["id"].is_null());
    assert_eq!(response["result"], json!({}));
}
