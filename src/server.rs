use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::config::{CheckerConfig, MAX_DEPTH_CEILING};
use crate::document::Document;
use crate::error::ShapeError;
use crate::presets::Preset;
use crate::protocol::{CheckError, CheckRequest, CheckResponse};
use crate::schema::Schema;
use crate::validate::Validator;

/// Maximum bytes per request line (1 MiB).
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Validates newline-delimited JSON requests, one response line per request.
pub struct CheckServer {
    config: CheckerConfig,
    validator: Validator,
    schemas: HashMap<Preset, Arc<Schema>>,
}

impl CheckServer {
    pub fn new(config: CheckerConfig) -> Result<Self, ShapeError> {
        if config.max_depth > MAX_DEPTH_CEILING {
            return Err(ShapeError::InvalidArgument(format!(
                "max_depth must not exceed {MAX_DEPTH_CEILING}"
            )));
        }
        let validator = Validator::with_max_depth(config.max_depth)?;
        let mut schemas = HashMap::new();
        for preset in Preset::ALL {
            schemas.insert(preset, Arc::new(preset.schema()?));
        }
        Ok(Self {
            config,
            validator,
            schemas,
        })
    }

    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Process `reader` until end of input.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), Box<dyn std::error::Error>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut raw = Vec::new();

        loop {
            raw.clear();
            let n = reader.read_until(b'\n', &mut raw).await?;
            if n == 0 {
                break;
            }

            if n > MAX_MESSAGE_BYTES {
                warn!("Message too large: {n} bytes (limit {MAX_MESSAGE_BYTES})");
                write_response(&mut writer, &CheckResponse::failed(None, CheckError::parse_error()))
                    .await?;
                continue;
            }

            if let Some(resp) = self.handle_line(&raw).await {
                write_response(&mut writer, &resp).await?;
            }
        }

        Ok(())
    }

    /// Answer one raw request line. Blank lines get no response.
    pub async fn handle_line(&self, raw: &[u8]) -> Option<CheckResponse> {
        let trimmed = match std::str::from_utf8(raw) {
            Ok(s) => s.trim(),
            Err(_) => return Some(CheckResponse::failed(None, CheckError::parse_error())),
        };

        if trimmed.is_empty() {
            return None;
        }

        // The request object adds one level; one more lets the walker report
        // the overflow together with the request id.
        let max_depth = self.validator.max_depth();
        if nesting_exceeds(trimmed.as_bytes(), max_depth + 2) {
            warn!("Request nesting exceeds {} levels", max_depth + 2);
            let err = ShapeError::DepthLimitExceeded { limit: max_depth };
            return Some(CheckResponse::failed(None, err.into()));
        }

        let json = match parse_unbounded(trimmed) {
            Ok(v) => v,
            Err(e) => {
                warn!("Parse error: {e}");
                return Some(CheckResponse::failed(None, CheckError::parse_error()));
            }
        };

        let req: CheckRequest = match serde_json::from_value(json) {
            Ok(r) => r,
            Err(e) => {
                return Some(CheckResponse::failed(
                    None,
                    CheckError::invalid_request(format!("Invalid request: {e}")),
                ));
            }
        };

        Some(self.check(req).await)
    }

    async fn check(&self, req: CheckRequest) -> CheckResponse {
        let CheckRequest { id, preset, value } = req;

        let preset = match preset {
            Some(name) => match name.parse::<Preset>() {
                Ok(p) => p,
                Err(_) => return CheckResponse::failed(id, CheckError::unknown_preset(&name)),
            },
            None => self.config.preset,
        };
        let Some(schema) = self.schemas.get(&preset).cloned() else {
            return CheckResponse::failed(id, CheckError::unknown_preset(preset.name()));
        };

        // Validation is synchronous; keep it off the reader loop
        let validator = self.validator;
        let timeout = self.config.check_timeout;
        let task = tokio::task::spawn_blocking(move || {
            let doc = Document::from_json(&value);
            validator.validate(doc.root(), &schema)
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(()))) => {
                debug!(%preset, "value accepted");
                CheckResponse::passed(id)
            }
            Ok(Ok(Err(err))) => {
                debug!(%preset, kind = ?err.kind(), "value rejected");
                CheckResponse::failed(id, err.into())
            }
            Ok(Err(join_err)) => {
                warn!("Task join error: {join_err}");
                CheckResponse::failed(id, CheckError::internal_error("Internal error"))
            }
            Err(_) => {
                warn!("Validation timed out after {} seconds", timeout.as_secs());
                CheckResponse::failed(id, CheckError::timeout(timeout.as_secs()))
            }
        }
    }
}

/// Parse without serde_json's fixed recursion limit; callers bound the
/// nesting with [`nesting_exceeds`] first.
fn parse_unbounded(text: &str) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Whether arrays and objects in `text` nest more than `limit` levels.
/// Brackets inside string literals are skipped.
fn nesting_exceeds(text: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &byte in text {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

async fn write_response<W>(writer: &mut W, resp: &CheckResponse) -> Result<(), Box<dyn std::error::Error>>
where
    W: AsyncWrite + Unpin,
{
    let out = serde_json::to_string(resp)?;
    writer.write_all(out.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
