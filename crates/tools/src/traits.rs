use crate::errors::ErrorPayload;
use async_trait::async_trait;

/// What a tool hands back to the protocol layer. Failures are values, never
/// faults.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Text(String),
    Error(ErrorPayload),
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }

    /// Text shown to the caller; error payloads render as their JSON form.
    pub fn text(&self) -> String {
        match self {
            ToolResult::Text(text) => text.clone(),
            ToolResult::Error(payload) => payload.to_json().to_string(),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> serde_json::Value;

    async fn execute(&self, args: serde_json::Value) -> ToolResult;
}
