//! Structural validation of JSON-like values against in-memory schemas.
//!
//! [`validate::validate_json`] accepts a value only when it is an object,
//! its nesting depth equals the schema's, its per-depth key layout
//! ([`shape::ShapeFingerprint`]) equals the schema's, and every field passes
//! its type marker, pattern or predicate. Traversals detect cycles and
//! enforce a depth limit instead of overflowing the stack.
//!
//! The `json-shape-guard` binary applies the built-in [`presets`] to
//! newline-delimited JSON requests on stdio.

pub mod config;
pub mod depth;
pub mod document;
pub mod equality;
pub mod error;
pub mod presets;
pub mod protocol;
pub mod schema;
pub mod server;
pub mod shape;
pub mod tracker;
pub mod tree;
pub mod validate;

pub use error::{ErrorKind, ShapeError};
pub use schema::Schema;
pub use validate::{validate_json, Validator};
