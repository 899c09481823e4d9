use std::time::Duration;

use crate::depth::DEFAULT_MAX_DEPTH;
use crate::presets::Preset;

/// Largest accepted `max_depth`. Request lines are parsed recursively up to
/// this nesting, so it bounds the parser's stack use.
pub const MAX_DEPTH_CEILING: usize = 1024;

/// Default timeout for one validation (30 seconds).
const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 30;

/// Checker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub preset: Preset,
    pub max_depth: usize,
    pub check_timeout: Duration,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            preset: Preset::UserAdditionalInfo,
            max_depth: DEFAULT_MAX_DEPTH,
            check_timeout: Duration::from_secs(DEFAULT_CHECK_TIMEOUT_SECS),
        }
    }
}

impl CheckerConfig {
    /// Load configuration from environment.
    ///
    /// - `SHAPE_GUARD_PRESET` (optional, default `user-additional-info`): schema used when a request names none
    /// - `SHAPE_GUARD_MAX_DEPTH` (optional, default 128, at most 1024): deepest nesting accepted
    /// - `SHAPE_GUARD_TIMEOUT_SECS` (optional, default 30): max seconds per validation
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`CheckerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let preset = match lookup("SHAPE_GUARD_PRESET") {
            Some(val) => val.parse::<Preset>()?,
            None => defaults.preset,
        };

        let max_depth = match lookup("SHAPE_GUARD_MAX_DEPTH") {
            Some(val) => positive(&val)
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n <= MAX_DEPTH_CEILING)
                .ok_or_else(|| {
                    format!("SHAPE_GUARD_MAX_DEPTH must be an integer between 1 and {MAX_DEPTH_CEILING}")
                })?,
            None => defaults.max_depth,
        };

        let check_timeout = match lookup("SHAPE_GUARD_TIMEOUT_SECS") {
            Some(val) => Duration::from_secs(
                positive(&val)
                    .ok_or_else(|| "SHAPE_GUARD_TIMEOUT_SECS must be a positive integer".to_string())?,
            ),
            None => defaults.check_timeout,
        };

        Ok(Self {
            preset,
            max_depth,
            check_timeout,
        })
    }
}

fn positive(val: &str) -> Option<u64> {
    val.trim().parse::<u64>().ok().filter(|n| *n > 0)
}
