use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Context, Result};
use crate::fetch::REFRESH_CONCURRENCY_LIMIT;

/// Application settings. Built-in defaults cover everything; a JSON file may
/// override any subset of fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Deployment sub-path the state token is appended to. Must start and
    /// end with `/`.
    pub base_path: String,
    /// Origin prepended to the current address when printing a share link.
    pub share_origin: String,
    /// Query parameter the static-hosting fallback redirect carries the
    /// token in.
    pub state_param: String,
    /// File the current address is persisted in between invocations.
    pub location_file: String,
    /// Stooq CSV quote endpoint.
    pub quote_endpoint: String,
    /// Worker cap for a refresh cycle.
    pub max_concurrent_requests: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Config {
    pub fn builtin() -> Self {
        Self {
            base_path: "/portfolio-treemap/".to_string(),
            share_origin: "https://example.github.io".to_string(),
            state_param: "p".to_string(),
            location_file: "assets/location.url".to_string(),
            quote_endpoint: "https://stooq.com/q/l/".to_string(),
            max_concurrent_requests: REFRESH_CONCURRENCY_LIMIT,
        }
    }

    /// Load settings from a JSON file, falling back to the defaults for any
    /// omitted field.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        if !self.base_path.starts_with('/') || !self.base_path.ends_with('/') {
            issues.push(format!(
                "base_path `{}` must start and end with `/`",
                self.base_path
            ));
        }
        if self.share_origin.is_empty() {
            issues.push("share_origin must not be empty".to_string());
        }
        if self.state_param.is_empty() {
            issues.push("state_param must not be empty".to_string());
        } else if self.state_param.contains(['=', '&', '?', '#']) {
            issues.push(format!(
                "state_param `{}` must not contain `= & ? #`",
                self.state_param
            ));
        }
        if self.location_file.is_empty() {
            issues.push("location_file must not be empty".to_string());
        }
        if self.quote_endpoint.is_empty() {
            issues.push("quote_endpoint must not be empty".to_string());
        }
        if self.max_concurrent_requests < 1 {
            issues.push("max_concurrent_requests must be at least 1".to_string());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(AppError::message(format!(
                "config invalid:\n  - {}",
                issues.join("\n  - ")
            )))
        }
    }
}
