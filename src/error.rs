//! Structured error types for the rendering engine.
//!
//! Only genuinely fatal conditions surface here: unparseable input and a
//! missing page setup. Asset failures and unknown node types degrade to
//! skipped nodes with a diagnostic on the log channel instead.

use thiserror::Error;

/// The unified error type returned by the public rendering API.
#[derive(Debug, Error)]
pub enum RenderError {
    /// JSON input failed to parse as a valid document description.
    #[error("failed to parse document: {source}{hint}")]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// The document is missing its required `page` block.
    #[error("missing required page setup (`page` block with size and margins)")]
    MissingPageSetup,

    /// Reading input or writing output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "\n  hint: check for trailing commas, missing quotes, or unescaped characters"
            }
            serde_json::error::Category::Data => {
                "\n  hint: the JSON is valid but does not match the document schema; check field names and types"
            }
            serde_json::error::Category::Eof => "\n  hint: unexpected end of input — is the JSON truncated?",
            serde_json::error::Category::Io => "",
        };
        RenderError::Parse {
            source: e,
            hint: hint.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_hint() {
        let bad: Result<serde_json::Value, _> = serde_json::from_str("{ \"a\": ");
        let err: RenderError = bad.unwrap_err().into();
        let msg = err.to_string();
        assert!(msg.contains("failed to parse document"));
        assert!(msg.contains("hint"));
    }
}
