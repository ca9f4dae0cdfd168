//! Newline-delimited JSON stdio adapter.
//!
//! Stands in for the protocol transport: each stdin line is one decoded
//! tool call `{"tool_name": …, "arguments": {…}}`, each stdout line is
//! either the tool's text-content result or a protocol error object.
//! Logging goes to stderr, never stdout, so the frame stream stays
//! clean.

use crate::dispatcher::ToolCatalog;
use pkgver_core::Result;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, Deserialize)]
struct CallRequest {
    #[serde(alias = "name")]
    tool_name: String,
    #[serde(default)]
    arguments: Value,
}

/// Handles one request line, producing one response line.
///
/// Malformed frames and failed calls become error objects rather than
/// terminating the loop; only I/O on the transport itself is fatal.
pub async fn handle_line(catalog: &ToolCatalog, line: &str) -> String {
    let request: CallRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            return json!({
                "error": {"kind": "invalid_request", "message": e.to_string()}
            })
            .to_string();
        }
    };

    let arguments = if request.arguments.is_null() {
        json!({})
    } else {
        request.arguments
    };

    match catalog.call_tool(&request.tool_name, arguments).await {
        Ok(response) => serde_json::to_string(&response)
            .unwrap_or_else(|e| json!({"error": {"kind": "internal", "message": e.to_string()}}).to_string()),
        Err(e) => {
            let kind = if e.is_caller_error() {
                "invalid_argument"
            } else {
                "internal"
            };
            tracing::error!("tool call {} failed: {e}", request.tool_name);
            json!({"error": {"kind": kind, "message": e.to_string()}}).to_string()
        }
    }
}

/// Serves tool calls over stdin/stdout until EOF.
pub async fn serve(catalog: &ToolCatalog) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(catalog, &line).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
