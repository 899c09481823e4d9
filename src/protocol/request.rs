use serde::{Deserialize, Serialize};

/// Request ID, echoed back in the response. May be a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    Str(String),
}

/// One line of checker input.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckRequest {
    #[serde(default)]
    pub id: Option<RequestId>,
    /// Preset name; the configured default when absent.
    #[serde(default)]
    pub preset: Option<String>,
    pub value: serde_json::Value,
}
