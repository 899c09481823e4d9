use serde_json::Value;
use tracing::debug;

use crate::depth::{measure_depth, Walk, DEFAULT_MAX_DEPTH};
use crate::document::{Document, NodeRef};
use crate::equality::{deep_equal, Datum};
use crate::error::ShapeError;
use crate::schema::{validate_object, Schema};
use crate::shape::map_shape;
use crate::tree::TreeNode;

/// Runs the validation gates in order: object check, depth, shape, fields.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    max_depth: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Result<Self, ShapeError> {
        if max_depth == 0 {
            return Err(ShapeError::InvalidArgument(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_depth })
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Validate `value` against `schema`, failing at the first gate that
    /// rejects it.
    pub fn validate(&self, value: NodeRef<'_>, schema: &Schema) -> Result<(), ShapeError> {
        require_json_object(value)?;
        if !schema.is_nested() {
            return Err(ShapeError::NotAJsonObject {
                subject: "schema",
                received: schema.type_name().to_string(),
            });
        }

        let expected = measure_depth(schema, Some(&mut self.walk()))?;
        let actual = measure_depth(value, Some(&mut self.walk()))?;
        debug!(expected, actual, "measured depths");
        if expected != actual {
            return Err(ShapeError::DepthMismatch { expected, actual });
        }

        let schema_shape = map_shape(schema, Some(&mut self.walk()))?;
        let value_shape = map_shape(value, Some(&mut self.walk()))?;
        if !deep_equal(&Datum::from(&schema_shape), &Datum::from(&value_shape)) {
            debug!("shape fingerprints differ");
            return Err(ShapeError::ShapeMismatch {
                received: value_shape.to_json_string(),
            });
        }

        let result = validate_object(value, schema);
        debug!(errors = result.errors.len(), "validated fields");
        if !result.valid {
            return Err(ShapeError::SchemaViolation {
                errors: result.errors,
            });
        }
        Ok(())
    }

    fn walk(&self) -> Walk {
        Walk::new(self.max_depth)
    }
}

/// Validate with the default limits.
pub fn validate_json(value: NodeRef<'_>, schema: &Schema) -> Result<(), ShapeError> {
    Validator::default().validate(value, schema)
}

/// Validate a `serde_json` value with the default limits.
pub fn validate_json_value(value: &Value, schema: &Schema) -> Result<(), ShapeError> {
    let doc = Document::from_json(value);
    validate_json(doc.root(), schema)
}

pub fn require_json_object(node: NodeRef<'_>) -> Result<(), ShapeError> {
    if node.is_object() {
        Ok(())
    } else {
        Err(ShapeError::NotAJsonObject {
            subject: "value",
            received: node.kind().name().to_string(),
        })
    }
}

/// Require `node` to be an object with exactly `expected` keys.
pub fn require_key_count(node: NodeRef<'_>, expected: usize) -> Result<(), ShapeError> {
    require_json_object(node)?;
    let actual = node.len();
    if actual != expected {
        return Err(ShapeError::KeyCountMismatch { expected, actual });
    }
    Ok(())
}

/// Require every key of `node` to be one of `allowed`.
pub fn require_key_names(node: NodeRef<'_>, allowed: &[&str]) -> Result<(), ShapeError> {
    require_json_object(node)?;
    if allowed.iter().any(|name| name.is_empty()) {
        return Err(ShapeError::InvalidArgument(
            "allowed key names must not be empty".to_string(),
        ));
    }
    match node.keys().find(|key| !allowed.contains(key)) {
        Some(key) => Err(ShapeError::UnknownKey {
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}
