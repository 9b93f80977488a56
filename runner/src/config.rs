//! Run configuration.
//!
//! Defaults are overridable from the environment (`.env` is loaded by the
//! CLI through `dotenvy`), and CLI flags override both.

use serde::{Deserialize, Serialize};
use std::env;

/// Fixed CSV delimiter instead of auto-detection.
pub const ENV_DELIMITER: &str = "WORKFLOW_RUNNER_DELIMITER";

/// `false`/`0`/`no`/`off` disables baseline structural checks.
pub const ENV_BASELINE: &str = "WORKFLOW_RUNNER_BASELINE";

/// `true`/`1`/`yes`/`on` stops echoing run events to stderr.
pub const ENV_QUIET: &str = "WORKFLOW_RUNNER_QUIET";

/// Options for reading and checking a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// CSV delimiter; auto-detected when `None`.
    pub delimiter: Option<char>,

    /// Report blank/duplicate headers and overlong rows before operations run.
    pub baseline_checks: bool,

    /// Do not echo run events to stderr; subscribers still receive them.
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            baseline_checks: true,
            quiet: false,
        }
    }
}

impl RunOptions {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(delimiter) = lookup(ENV_DELIMITER).and_then(|v| parse_delimiter(&v)) {
            options.delimiter = Some(delimiter);
        }
        if let Some(baseline) = lookup(ENV_BASELINE).and_then(|v| parse_flag(&v)) {
            options.baseline_checks = baseline;
        }
        if let Some(quiet) = lookup(ENV_QUIET).and_then(|v| parse_flag(&v)) {
            options.quiet = quiet;
        }

        options
    }
}

/// Parse a delimiter setting; `\t` and `tab` mean a tab.
pub fn parse_delimiter(value: &str) -> Option<char> {
    match value {
        "\\t" | "tab" | "TAB" | "\t" => Some('\t'),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
