use serde::Serialize;

use super::request::RequestId;
use crate::error::{ErrorKind, ShapeError};

/// One line of checker output.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckError>,
}

impl CheckResponse {
    pub fn passed(id: Option<RequestId>) -> Self {
        Self {
            id,
            valid: true,
            error: None,
        }
    }

    pub fn failed(id: Option<RequestId>, error: CheckError) -> Self {
        Self {
            id,
            valid: false,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// Failures of the line protocol itself, before any validation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolErrorCode {
    ParseError,
    InvalidRequest,
    UnknownPreset,
    Timeout,
    InternalError,
}

/// Serialized as a flat snake_case string, e.g. `"parse_error"` or
/// `"schema_violation"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Protocol(ProtocolErrorCode),
    Validation(ErrorKind),
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl CheckError {
    fn protocol(code: ProtocolErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Protocol(code),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn parse_error() -> Self {
        Self::protocol(ProtocolErrorCode::ParseError, "Parse error")
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::protocol(ProtocolErrorCode::InvalidRequest, detail)
    }

    pub fn unknown_preset(name: &str) -> Self {
        Self::protocol(
            ProtocolErrorCode::UnknownPreset,
            format!("Unknown preset: {name}"),
        )
    }

    pub fn timeout(secs: u64) -> Self {
        Self::protocol(
            ProtocolErrorCode::Timeout,
            format!("Validation timed out after {secs} seconds"),
        )
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::protocol(ProtocolErrorCode::InternalError, detail)
    }
}

/// The message is the error's display text; schema violations also carry
/// each field diagnostic in `details`.
impl From<ShapeError> for CheckError {
    fn from(err: ShapeError) -> Self {
        Self {
            code: ErrorCode::Validation(err.kind()),
            message: err.to_string(),
            details: err.details().to_vec(),
        }
    }
}
