//! MCP server over stdio: one JSON-RPC message per line.

use super::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities,
    ServerInfo, ToolCallParams, ToolCallResult, ToolsCapability, ToolsListResult,
};
use super::tools::get_tools;
use crate::actions::{normalize, validate};
use crate::dispatch::Dispatcher;
use crate::security::{
    AutoDenyBroker, ConfirmationBroker, ConfirmationRequest, decide, settle,
};
use crate::utils::text::truncate_with_marker;
use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub struct McpServer {
    dispatcher: Dispatcher,
    broker: Arc<dyn ConfirmationBroker>,
    auto_approve: bool,
}

impl McpServer {
    /// Confirmation-required actions are denied unless `auto_approve` is set;
    /// there is no operator to ask.
    pub fn new(dispatcher: Dispatcher, auto_approve: bool) -> Self {
        Self {
            dispatcher,
            broker: Arc::new(AutoDenyBroker {
                reason: "no interactive operator on the MCP transport".into(),
            }),
            auto_approve,
        }
    }

    /// Serve on the process stdin/stdout until stdin closes.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        tracing::info!("MCP server started, waiting for messages");
        self.serve(stdin, stdout).await?;
        tracing::info!("MCP server shutting down");
        Ok(())
    }

    /// Answer one request per line until the reader is exhausted. A line that
    /// is not UTF-8 gets a parse error; the loop keeps going.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut frame = Vec::new();
        loop {
            frame.clear();
            let read = reader
                .read_until(b'\n', &mut frame)
                .await
                .context("reading request")?;
            if read == 0 {
                break;
            }

            let response = match std::str::from_utf8(&frame) {
                Ok(text) => {
                    let line = text.trim();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::debug!(request = %truncate_with_marker(line, 100, "..."), "<-");
                    self.handle(line).await
                }
                Err(e) => {
                    tracing::warn!("discarding request that is not UTF-8: {e}");
                    Some(JsonRpcResponse::error(
                        None,
                        PARSE_ERROR,
                        format!("request is not valid UTF-8: {e}"),
                    ))
                }
            };
            let Some(response) = response else {
                continue;
            };
            let out = serde_json::to_string(&response)?;
            tracing::debug!(response = %truncate_with_marker(&out, 100, "..."), "->");

            writer.write_all(out.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Handle one message. Notifications get no response.
    pub async fn handle(&self, msg: &str) -> Option<JsonRpcResponse> {
        let req: JsonRpcRequest = match serde_json::from_str(msg) {
            Ok(r) => r,
            Err(e) => {
                let code = if serde_json::from_str::<Value>(msg).is_ok() {
                    INVALID_REQUEST
                } else {
                    PARSE_ERROR
                };
                return Some(JsonRpcResponse::error(None, code, e.to_string()));
            }
        };

        if req.is_notification() {
            tracing::debug!(method = %req.method, "notification");
            return None;
        }
        let id = req.id.clone();

        let response = match req.method.as_str() {
            "initialize" => to_response(
                id,
                &InitializeResult {
                    protocol_version: PROTOCOL_VERSION.into(),
                    capabilities: ServerCapabilities {
                        tools: ToolsCapability {
                            list_changed: false,
                        },
                    },
                    server_info: ServerInfo {
                        name: env!("CARGO_PKG_NAME").into(),
                        version: env!("CARGO_PKG_VERSION").into(),
                    },
                },
            ),

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => to_response(id, &ToolsListResult { tools: get_tools() }),

            "tools/call" => {
                let params: ToolCallParams = match serde_json::from_value(req.params) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()));
                    }
                };
                let arguments = match params.arguments {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    _ => {
                        return Some(JsonRpcResponse::error(
                            id,
                            INVALID_PARAMS,
                            "arguments must be an object",
                        ));
                    }
                };
                let result = self.call_tool(&params.name, &arguments).await;
                to_response(id, &result)
            }

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {}", req.method),
            ),
        };
        Some(response)
    }

    /// Same path as a local proposal: normalize, validate, gate, dispatch.
    pub async fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> ToolCallResult {
        let action = normalize(name, arguments);
        tracing::info!(action = %action.label(), "tool call");

        let operation = match validate(&action) {
            Ok(operation) => operation,
            Err(error) => return ToolCallResult::error(format!("invalid action: {error}")),
        };

        let request = ConfirmationRequest {
            action: action.clone(),
            explanation: None,
        };
        let decision = settle(
            decide(&action, self.auto_approve),
            self.broker.as_ref(),
            &request,
        )
        .await;
        if !decision.permits_execution() {
            return ToolCallResult::error(format!(
                "{} requires confirmation and was denied; restart the server with auto-approve to allow it",
                action.label()
            ));
        }

        let envelope = self.dispatcher.execute(&operation).await;
        match serde_json::to_string_pretty(&envelope) {
            Ok(text) => ToolCallResult::text(text, !envelope.is_success()),
            Err(e) => ToolCallResult::error(format!("failed to encode result: {e}")),
        }
    }
}

fn to_response(id: Option<Value>, result: &impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse::success(id, v),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {e}")),
    }
}
