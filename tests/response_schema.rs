use jsonschema::validator_for;
use serde_json::Value;

use json_shape_guard::error::ShapeError;
use json_shape_guard::protocol::{CheckError, CheckResponse, RequestId};

/// Frozen JSON Schema of one checker output line.
const RESPONSE_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "Shape guard response v0",
  "type": "object",
  "required": ["valid"],
  "additionalProperties": false,
  "properties": {
    "id": { "type": ["integer", "string"] },
    "valid": { "type": "boolean" },
    "error": {
      "type": "object",
      "required": ["code", "message"],
      "additionalProperties": false,
      "properties": {
        "code": {
          "type": "string",
          "enum": [
            "parse_error",
            "invalid_request",
            "unknown_preset",
            "timeout",
            "internal_error",
            "cycle_detected",
            "depth_limit_exceeded",
            "not_a_json_object",
            "invalid_argument",
            "depth_mismatch",
            "shape_mismatch",
            "schema_violation",
            "key_count_mismatch",
            "unknown_key"
          ]
        },
        "message": { "type": "string", "minLength": 1 },
        "details": {
          "type": "array",
          "minItems": 1,
          "items": { "type": "string" }
        }
      }
    }
  }
}"#;

fn assert_conforms(response: &CheckResponse) {
    let schema_json: Value = serde_json::from_str(RESPONSE_SCHEMA).unwrap();
    let validator = validator_for(&schema_json).unwrap();
    let json = serde_json::to_value(response).unwrap();
    assert!(validator.is_valid(&json), "response must satisfy v0 schema: {json}");
}

#[test]
fn golden_depth_mismatch_response() {
    let response = CheckResponse::failed(
        Some(RequestId::Number(7)),
        ShapeError::DepthMismatch { expected: 2, actual: 3 }.into(),
    );
    assert_conforms(&response);

    let json_str = serde_json::to_string_pretty(&response).unwrap();
    let expected = r#"{
  "id": 7,
  "valid": false,
  "error": {
    "code": "depth_mismatch",
    "message": "value has a depth of 3, but the schema expects 2"
  }
}"#;
    assert_eq!(json_str.trim(), expected.trim(), "response JSON snapshot mismatch");
}

#[test]
fn golden_schema_violation_response() {
    let response = CheckResponse::failed(
        Some(RequestId::Str("a".into())),
        ShapeError::SchemaViolation {
            errors: vec![
                "error at root.age: invalid value (15)".to_string(),
                "error at root.name: expected string or null, received number".to_string(),
            ],
        }
        .into(),
    );
    assert_conforms(&response);

    let json_str = serde_json::to_string_pretty(&response).unwrap();
    let expected = r#"{
  "id": "a",
  "valid": false,
  "error": {
    "code": "schema_violation",
    "message": "invalid object: error at root.age: invalid value (15); error at root.name: expected string or null, received number",
    "details": [
      "error at root.age: invalid value (15)",
      "error at root.name: expected string or null, received number"
    ]
  }
}"#;
    assert_eq!(json_str.trim(), expected.trim(), "response JSON snapshot mismatch");
}

#[test]
fn every_response_kind_satisfies_the_schema() {
    let errors: Vec<CheckError> = vec![
        CheckError::parse_error(),
        CheckError::invalid_request("Invalid request: missing field `value`"),
        CheckError::unknown_preset("nope"),
        CheckError::timeout(30),
        CheckError::internal_error("Internal error"),
        ShapeError::CycleDetected { depth: 2 }.into(),
        ShapeError::DepthLimitExceeded { limit: 8 }.into(),
        ShapeError::NotAJsonObject { subject: "value", received: "array".into() }.into(),
        ShapeError::InvalidArgument("max_depth must be at least 1".into()).into(),
        ShapeError::ShapeMismatch { received: "{}".into() }.into(),
        ShapeError::KeyCountMismatch { expected: 1, actual: 2 }.into(),
        ShapeError::UnknownKey { key: "x".into() }.into(),
    ];

    assert_conforms(&CheckResponse::passed(None));
    assert_conforms(&CheckResponse::passed(Some(RequestId::Number(1))));
    for error in errors {
        assert_conforms(&CheckResponse::failed(None, error));
    }
}
