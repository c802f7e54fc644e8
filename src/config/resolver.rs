//! Unified precedence resolution for configuration and state.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`TW_API_URL`, `TW_TOKEN`)
//! 3. config.kdl / state.kdl in the config directory
//! 4. Built-in defaults

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use super::schema::{
    DEFAULT_API_URL, DEFAULT_CELL_WIDTH_PX, DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_RESIZE_DEBOUNCE_MS, mask_token,
};
use super::{read_config, read_state};
use crate::Result;
use crate::models::DisplayMode;

/// Environment variable overriding `api-url`.
pub const API_URL_ENV: &str = "TW_API_URL";

/// Environment variable overriding the stored auth token.
pub const TOKEN_ENV: &str = "TW_TOKEN";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl or state.kdl
    File,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File => write!(f, "file"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub api_url: Resolved<String>,
    pub request_timeout_ms: Resolved<u64>,
    pub resize_debounce_ms: Resolved<u64>,
    pub cell_width_px: Resolved<u32>,
    pub log_level: Resolved<String>,
    pub display_mode: Resolved<DisplayMode>,
    #[serde(skip)]
    pub auth_token: Option<Resolved<String>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_url: Resolved::new(DEFAULT_API_URL.to_string(), ValueSource::Default),
            request_timeout_ms: Resolved::new(DEFAULT_REQUEST_TIMEOUT_MS, ValueSource::Default),
            resize_debounce_ms: Resolved::new(DEFAULT_RESIZE_DEBOUNCE_MS, ValueSource::Default),
            cell_width_px: Resolved::new(DEFAULT_CELL_WIDTH_PX, ValueSource::Default),
            log_level: Resolved::new(DEFAULT_LOG_LEVEL.to_string(), ValueSource::Default),
            display_mode: Resolved::new(DisplayMode::default(), ValueSource::Default),
            auth_token: None,
        }
    }
}

impl ResolvedConfig {
    pub fn api_url(&self) -> &str {
        &self.api_url.value
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.value)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms.value)
    }

    pub fn cell_width_px(&self) -> u32 {
        self.cell_width_px.value
    }

    pub fn log_level(&self) -> &str {
        &self.log_level.value
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode.value
    }

    pub fn token(&self) -> Option<&str> {
        self.auth_token.as_ref().map(|r| r.value.as_str())
    }

    /// Get the masked token for display purposes.
    pub fn masked_token(&self) -> Option<String> {
        self.token().map(mask_token)
    }

    pub fn token_source(&self) -> Option<&ValueSource> {
        self.auth_token.as_ref().map(|r| &r.source)
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }
}

/// Resolve settings from `dir`, the process environment and CLI overrides.
pub fn resolve_config(dir: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    resolve_config_with_env(dir, overrides, |name| std::env::var(name).ok())
}

/// Resolve settings with an explicit environment lookup.
pub fn resolve_config_with_env(
    dir: &Path,
    overrides: &ConfigOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let file = read_config(dir)?;
    let state = read_state(dir)?;
    let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());
    let mut result = ResolvedConfig::default();

    // api-url
    if let Some(ref url) = overrides.api_url {
        result.api_url = Resolved::new(url.clone(), ValueSource::CliFlag);
    } else if let Some(url) = env(API_URL_ENV) {
        result.api_url = Resolved::new(url, ValueSource::EnvVar(API_URL_ENV.to_string()));
    } else if let Some(url) = file.api_url {
        result.api_url = Resolved::new(url, ValueSource::File);
    }

    if let Some(ms) = file.request_timeout_ms {
        result.request_timeout_ms = Resolved::new(ms, ValueSource::File);
    }
    if let Some(ms) = file.resize_debounce_ms {
        result.resize_debounce_ms = Resolved::new(ms, ValueSource::File);
    }
    if let Some(px) = file.cell_width_px {
        result.cell_width_px = Resolved::new(px, ValueSource::File);
    }
    if let Some(mode) = file.display_mode {
        result.display_mode = Resolved::new(mode, ValueSource::File);
    }

    // log-level
    if let Some(ref level) = overrides.log_level {
        result.log_level = Resolved::new(level.clone(), ValueSource::CliFlag);
    } else if let Some(level) = file.log_level {
        result.log_level = Resolved::new(level, ValueSource::File);
    }

    // auth token
    if let Some(token) = env(TOKEN_ENV) {
        result.auth_token = Some(Resolved::new(
            token,
            ValueSource::EnvVar(TOKEN_ENV.to_string()),
        ));
    } else if let Some(token) = state.auth_token {
        result.auth_token = Some(Resolved::new(token, ValueSource::File));
    }

    Ok(result)
}
