//! MCP tool implementations.
//!
//! Each tool has a `*_impl` function taking the shared `AppState` and its
//! parameters, returning pretty-printed JSON text.

pub mod favorites;
pub mod search;
pub mod site;
pub mod sites;

use rmcp::{ErrorData as McpError, model::*};
use serde::Serialize;

use crate::error::ToolError;

/// Wrap `output` as a successful JSON text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(output).map_err(|e| ToolError::EncodeFailed(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
