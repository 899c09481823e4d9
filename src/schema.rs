//! Schema trees and the field-by-field validator.
//!
//! A schema mirrors the objects it accepts: every nested object of the
//! value corresponds to a [`Schema::Nested`] node, and every leaf field to
//! a type marker, a pattern or a predicate.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;

use crate::document::NodeRef;
use crate::error::ShapeError;
use crate::tree::{NodeIdentity, TreeNode};

/// Primitive type markers. Each accepts its type or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, node: NodeRef<'_>) -> bool {
        if node.is_null() {
            return true;
        }
        match self {
            Self::String => node.as_str().is_some(),
            Self::Number => node.as_f64().is_some(),
            Self::Boolean => node.as_bool().is_some(),
        }
    }
}

type TestFn = dyn Fn(Option<NodeRef<'_>>) -> bool + Send + Sync;
type RuleFn = dyn Fn(Option<NodeRef<'_>>) -> Result<(), String> + Send + Sync;

#[derive(Clone)]
enum Check {
    Test(Arc<TestFn>),
    Rule(Arc<RuleFn>),
}

/// Custom field check. Receives `None` when the field is absent.
#[derive(Clone)]
pub struct Predicate(Check);

impl Predicate {
    pub fn test<F>(f: F) -> Self
    where
        F: Fn(Option<NodeRef<'_>>) -> bool + Send + Sync + 'static,
    {
        Self(Check::Test(Arc::new(f)))
    }

    /// A check that explains its rejections.
    pub fn rule<F>(f: F) -> Self
    where
        F: Fn(Option<NodeRef<'_>>) -> Result<(), String> + Send + Sync + 'static,
    {
        Self(Check::Rule(Arc::new(f)))
    }

    /// `Ok` when the value passes, otherwise the rule's reason if any.
    pub fn evaluate(&self, actual: Option<NodeRef<'_>>) -> Result<(), Option<String>> {
        match &self.0 {
            Check::Test(f) => {
                if f(actual) {
                    Ok(())
                } else {
                    Err(None)
                }
            }
            Check::Rule(f) => f(actual).map_err(Some),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Check::Test(_) => f.write_str("Predicate::Test(..)"),
            Check::Rule(_) => f.write_str("Predicate::Rule(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Schema {
    Type(PrimitiveType),
    Pattern(Regex),
    Predicate(Predicate),
    Nested(BTreeMap<String, Schema>),
}

impl Schema {
    pub fn string() -> Self {
        Self::Type(PrimitiveType::String)
    }

    pub fn number() -> Self {
        Self::Type(PrimitiveType::Number)
    }

    pub fn boolean() -> Self {
        Self::Type(PrimitiveType::Boolean)
    }

    pub fn pattern(source: &str) -> Result<Self, ShapeError> {
        Ok(Self::Pattern(Regex::new(source)?))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(Option<NodeRef<'_>>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Predicate::test(f))
    }

    pub fn rule<F>(f: F) -> Self
    where
        F: Fn(Option<NodeRef<'_>>) -> Result<(), String> + Send + Sync + 'static,
    {
        Self::Predicate(Predicate::rule(f))
    }

    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::Nested(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }

    /// Field `key` of a nested schema.
    pub fn field(&self, key: &str) -> Option<&Schema> {
        match self {
            Self::Nested(fields) => fields.get(key),
            _ => None,
        }
    }
}

impl<'a> TreeNode for &'a Schema {
    fn identity(self) -> Option<NodeIdentity> {
        self.is_nested()
            .then(|| NodeIdentity::new(self as *const Schema as usize))
    }

    fn is_mapping(self) -> bool {
        self.is_nested()
    }

    fn entries(self) -> Vec<(String, Self)> {
        match self {
            Schema::Nested(fields) => fields.iter().map(|(k, v)| (k.clone(), v)).collect(),
            _ => Vec::new(),
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            Schema::Type(_) => "type marker",
            Schema::Pattern(_) => "pattern",
            Schema::Predicate(_) => "predicate",
            Schema::Nested(_) => "object",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate `value` against `schema`, with paths rooted at `root`.
///
/// Only fields named by the schema are inspected. Never fails: every
/// problem becomes a diagnostic in the result.
pub fn validate_object(value: NodeRef<'_>, schema: &Schema) -> ValidationResult {
    validate_object_at(value, schema, "root")
}

pub fn validate_object_at(value: NodeRef<'_>, schema: &Schema, path: &str) -> ValidationResult {
    let mut errors = Vec::new();
    collect_errors(value, schema, path, &mut errors);
    ValidationResult::from_errors(errors)
}

fn collect_errors(value: NodeRef<'_>, schema: &Schema, path: &str, errors: &mut Vec<String>) {
    let Schema::Nested(fields) = schema else {
        return;
    };

    for (key, expected) in fields {
        let actual = value.get(key);
        let current_path = format!("{path}.{key}");

        match expected {
            Schema::Predicate(predicate) => match predicate.evaluate(actual) {
                Ok(()) => {}
                Err(None) => errors.push(format!(
                    "error at {current_path}: invalid value ({})",
                    observed(actual)
                )),
                Err(Some(reason)) => errors.push(format!(
                    "error at {current_path}: invalid value ({}): {reason}",
                    observed(actual)
                )),
            },
            Schema::Type(marker) => {
                if !actual.is_some_and(|node| marker.accepts(node)) {
                    errors.push(format!(
                        "error at {current_path}: expected {} or null, received {}",
                        marker.name(),
                        type_of(actual)
                    ));
                }
            }
            Schema::Pattern(pattern) => {
                let matches = actual.is_some_and(|node| {
                    node.is_null() || node.as_str().is_some_and(|s| pattern.is_match(s))
                });
                if !matches {
                    errors.push(format!(
                        "error at {current_path}: value ({}) does not match /{}/",
                        observed(actual),
                        pattern.as_str()
                    ));
                }
            }
            Schema::Nested(_) => match actual {
                Some(node) if node.kind().is_composite() => {
                    collect_errors(node, expected, &current_path, errors);
                }
                _ => errors.push(format!(
                    "error at {current_path}: expected object, received {}",
                    type_of(actual)
                )),
            },
        }
    }
}

fn observed(actual: Option<NodeRef<'_>>) -> String {
    actual.map_or_else(|| "missing".to_string(), |node| node.to_string())
}

fn type_of(actual: Option<NodeRef<'_>>) -> &'static str {
    actual.map_or("missing", |node| node.kind().name())
}
