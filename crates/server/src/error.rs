//! Errors raised by the tool layer itself, before or after the core services.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the tabdeck server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool arguments that do not decode (e.g., bad base64).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be serialized.
    #[error("ENCODE_FAILED: {0}")]
    EncodeFailed(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::InvalidInput(msg) => (-32602, msg.clone()),
            ToolError::EncodeFailed(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: McpError = ToolError::InvalidInput("bad base64".into()).into();
        assert_eq!(err.code, ErrorCode(-32602));
        assert_eq!(err.message, "bad base64");

        let err: McpError = ToolError::EncodeFailed("x".into()).into();
        assert_eq!(err.code, ErrorCode(-32603));
    }
}
