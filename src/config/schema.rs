//! KDL schema definitions for config.kdl and state.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation functions
//! - Default values

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

use crate::models::DisplayMode;

/// Default entity service URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default resize debounce window in milliseconds
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 150;

/// Default width of one terminal cell in pixels, used to classify the terminal
pub const DEFAULT_CELL_WIDTH_PX: u32 = 8;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Keys accepted by `tw config set`.
pub const CONFIG_KEYS: [&str; 6] = [
    "api-url",
    "request-timeout-ms",
    "resize-debounce-ms",
    "cell-width-px",
    "log-level",
    "display-mode",
];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// api-url "https://qa.example.com"
/// request-timeout-ms 10000
/// resize-debounce-ms 150
/// cell-width-px 8
/// log-level "info"
/// display-mode "full"  // or "compact"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackwiseConfig {
    pub api_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub resize_debounce_ms: Option<u64>,
    pub cell_width_px: Option<u32>,
    pub log_level: Option<String>,
    pub display_mode: Option<DisplayMode>,
}

impl TrackwiseConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("api-url must start with http:// or https://, got {}", url));
            }
        }
        if self.request_timeout_ms == Some(0) {
            return Err("request-timeout-ms must be positive".to_string());
        }
        if self.cell_width_px == Some(0) {
            return Err("cell-width-px must be positive".to_string());
        }
        if let Some(ref level) = self.log_level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(format!(
                    "log-level must be one of {}, got {}",
                    LOG_LEVELS.join(", "),
                    level
                ));
            }
        }
        Ok(())
    }

    /// Set one value from its `config.kdl` key and string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let parse_u64 = |v: &str| {
            v.parse::<u64>()
                .map_err(|_| format!("{} must be a non-negative integer, got {}", key, v))
        };
        match key {
            "api-url" => self.api_url = Some(value.trim_end_matches('/').to_string()),
            "request-timeout-ms" => self.request_timeout_ms = Some(parse_u64(value)?),
            "resize-debounce-ms" => self.resize_debounce_ms = Some(parse_u64(value)?),
            "cell-width-px" => {
                let width = parse_u64(value)?;
                self.cell_width_px =
                    Some(u32::try_from(width).map_err(|_| format!("{} is too large", key))?);
            }
            "log-level" => self.log_level = Some(value.to_lowercase()),
            "display-mode" => {
                self.display_mode = Some(DisplayMode::parse(value).ok_or_else(|| {
                    format!("display-mode must be compact or full, got {}", value)
                })?)
            }
            _ => {
                return Err(format!(
                    "unknown config key '{}' (expected one of: {})",
                    key,
                    CONFIG_KEYS.join(", ")
                ));
            }
        }
        self.validate()
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();
        config.api_url = first_string(doc, "api-url");
        config.request_timeout_ms = first_integer(doc, "request-timeout-ms")
            .and_then(|i| u64::try_from(i).ok());
        config.resize_debounce_ms = first_integer(doc, "resize-debounce-ms")
            .and_then(|i| u64::try_from(i).ok());
        config.cell_width_px =
            first_integer(doc, "cell-width-px").and_then(|i| u32::try_from(i).ok());
        config.log_level = first_string(doc, "log-level");
        config.display_mode =
            first_string(doc, "display-mode").and_then(|s| DisplayMode::parse(&s));
        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();
        if let Some(ref url) = self.api_url {
            push_node(&mut doc, "api-url", KdlValue::String(url.clone()));
        }
        if let Some(ms) = self.request_timeout_ms {
            push_node(&mut doc, "request-timeout-ms", KdlValue::Integer(ms as i128));
        }
        if let Some(ms) = self.resize_debounce_ms {
            push_node(&mut doc, "resize-debounce-ms", KdlValue::Integer(ms as i128));
        }
        if let Some(px) = self.cell_width_px {
            push_node(&mut doc, "cell-width-px", KdlValue::Integer(px as i128));
        }
        if let Some(ref level) = self.log_level {
            push_node(&mut doc, "log-level", KdlValue::String(level.clone()));
        }
        if let Some(mode) = self.display_mode {
            push_node(
                &mut doc,
                "display-mode",
                KdlValue::String(mode.as_str().to_string()),
            );
        }
        doc
    }
}

/// Runtime state stored in state.kdl.
///
/// Contains the API session token.
/// **MUST be created with 0600 permissions (owner read/write only)**.
///
/// # KDL Schema
///
/// ```kdl
/// auth-token "eyJhbGciOi..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackwiseState {
    /// Bearer token for the entity service (sensitive!)
    pub auth_token: Option<String>,
}

impl TrackwiseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse state from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            auth_token: first_string(doc, "auth-token"),
        }
    }

    /// Convert state to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();
        if let Some(ref token) = self.auth_token {
            push_node(&mut doc, "auth-token", KdlValue::String(token.clone()));
        }
        doc
    }
}

/// Mask a token for display, keeping the first and last four characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        let head: String = chars.iter().take(4.min(chars.len())).collect();
        format!("{}...", head)
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Required permissions for state.kdl (Unix: 0600, owner read/write only).
pub const STATE_FILE_MODE: u32 = 0o600;

/// Required permissions for config.kdl (Unix: 0644, readable by all).
pub const CONFIG_FILE_MODE: u32 = 0o644;

fn first_string(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
        .map(str::to_string)
}

fn first_integer(doc: &KdlDocument, name: &str) -> Option<i128> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_integer())
}

fn push_node(doc: &mut KdlDocument, name: &str, value: KdlValue) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(value));
    doc.nodes_mut().push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TrackwiseConfig::default();
        assert_eq!(config.api_url, None);
        assert_eq!(config.request_timeout_ms, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_bad_url() {
        let config = TrackwiseConfig {
            api_url: Some("localhost:8080".to_string()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("api-url"));
    }

    #[test]
    fn test_config_validate_rejects_zero_timeout() {
        let config = TrackwiseConfig {
            request_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_rejects_unknown_log_level() {
        let config = TrackwiseConfig {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("log-level"));
    }

    #[test]
    fn test_config_from_kdl_full() {
        let kdl = r#"
            api-url "https://qa.example.com"
            request-timeout-ms 5000
            resize-debounce-ms 200
            cell-width-px 9
            log-level "debug"
            display-mode "compact"
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let config = TrackwiseConfig::from_kdl(&doc);

        assert_eq!(config.api_url.as_deref(), Some("https://qa.example.com"));
        assert_eq!(config.request_timeout_ms, Some(5000));
        assert_eq!(config.resize_debounce_ms, Some(200));
        assert_eq!(config.cell_width_px, Some(9));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.display_mode, Some(DisplayMode::Compact));
    }

    #[test]
    fn test_config_from_kdl_ignores_negative_numbers() {
        let doc: KdlDocument = "request-timeout-ms -5".parse().unwrap();
        let config = TrackwiseConfig::from_kdl(&doc);
        assert_eq!(config.request_timeout_ms, None);
    }

    #[test]
    fn test_config_to_kdl_roundtrip() {
        let config = TrackwiseConfig {
            api_url: Some("http://qa.internal:9000".to_string()),
            request_timeout_ms: Some(2500),
            display_mode: Some(DisplayMode::Full),
            ..Default::default()
        };
        let doc = config.to_kdl();
        let reparsed: KdlDocument = doc.to_string().parse().unwrap();
        assert_eq!(TrackwiseConfig::from_kdl(&reparsed), config);
    }

    #[test]
    fn test_config_set_known_keys() {
        let mut config = TrackwiseConfig::new();
        config.set("api-url", "https://qa.example.com/").unwrap();
        config.set("cell-width-px", "10").unwrap();
        config.set("display-mode", "COMPACT").unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://qa.example.com"));
        assert_eq!(config.cell_width_px, Some(10));
        assert_eq!(config.display_mode, Some(DisplayMode::Compact));
    }

    #[test]
    fn test_config_set_rejects_unknown_key_and_bad_values() {
        let mut config = TrackwiseConfig::new();
        assert!(config.set("editor", "vim").unwrap_err().contains("unknown"));
        assert!(config.set("request-timeout-ms", "soon").is_err());
        assert!(config.set("display-mode", "huge").is_err());
    }

    #[test]
    fn test_state_roundtrip() {
        let state = TrackwiseState {
            auth_token: Some("secret-token-value".to_string()),
        };
        let reparsed: KdlDocument = state.to_kdl().to_string().parse().unwrap();
        assert_eq!(TrackwiseState::from_kdl(&reparsed), state);
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdefghijklmnop"), "abcd...mnop");
        assert_eq!(mask_token("short"), "shor...");
        assert_eq!(mask_token("ab"), "ab...");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_modes() {
        assert_eq!(STATE_FILE_MODE, 0o600);
        assert_eq!(CONFIG_FILE_MODE, 0o644);
    }
}
