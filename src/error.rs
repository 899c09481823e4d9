use serde::{Deserialize, Serialize};

/// Failure raised by the walkers, the guards and the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("cycle detected at depth {depth}: a composite node was revisited within the same traversal")]
    CycleDetected { depth: usize },

    #[error("nesting deeper than the limit of {limit} levels")]
    DepthLimitExceeded { limit: usize },

    #[error("{subject} must be a JSON object, received {received}")]
    NotAJsonObject {
        subject: &'static str,
        received: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("value has a depth of {actual}, but the schema expects {expected}")]
    DepthMismatch { expected: usize, actual: usize },

    #[error("value shape differs from the schema shape; received map {received}")]
    ShapeMismatch { received: String },

    #[error("invalid object: {}", .errors.join("; "))]
    SchemaViolation { errors: Vec<String> },

    #[error("object has {actual} keys, but {expected} were expected")]
    KeyCountMismatch { expected: usize, actual: usize },

    #[error("key {key:?} is not a valid key for this object")]
    UnknownKey { key: String },
}

impl ShapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CycleDetected { .. } => ErrorKind::CycleDetected,
            Self::DepthLimitExceeded { .. } => ErrorKind::DepthLimitExceeded,
            Self::NotAJsonObject { .. } => ErrorKind::NotAJsonObject,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::DepthMismatch { .. } => ErrorKind::DepthMismatch,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Self::KeyCountMismatch { .. } => ErrorKind::KeyCountMismatch,
            Self::UnknownKey { .. } => ErrorKind::UnknownKey,
        }
    }

    /// Individual field diagnostics, non-empty only for schema violations.
    pub fn details(&self) -> &[String] {
        match self {
            Self::SchemaViolation { errors } => errors,
            _ => &[],
        }
    }
}

impl From<regex::Error> for ShapeError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidArgument(format!("invalid pattern: {err}"))
    }
}

/// Stable, serializable tag for each [`ShapeError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CycleDetected,
    DepthLimitExceeded,
    NotAJsonObject,
    InvalidArgument,
    DepthMismatch,
    ShapeMismatch,
    SchemaViolation,
    KeyCountMismatch,
    UnknownKey,
}
