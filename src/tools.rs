use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

mod weather;

pub(crate) type ToolHandler = Arc<
    dyn Fn(serde_json::Value) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send>>
        + Send
        + Sync,
>;

pub(crate) struct ToolDefinition {
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    pub(crate) input_schema: serde_json::Value,
    pub(crate) handler: ToolHandler,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ToolError {
    #[error("invalid tool input: {0}")]
    Input(serde_json::Error),
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed provider response: {0}")]
    Malformed(serde_json::Error),
}

pub(crate) fn get_all_tools(client: reqwest::Client, weather_api_key: String) -> Vec<ToolDefinition> {
    vec![weather::definition(client, weather_api_key)]
}
