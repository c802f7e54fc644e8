//! Configuration and state management for Trackwise.
//!
//! Two KDL files live in the config directory:
//!
//! ## config.kdl - User preferences
//!
//! - `api-url` - Base URL of the entity service
//! - `request-timeout-ms` - Per-request timeout
//! - `resize-debounce-ms` - Quiet period before a resize reclassifies the viewport
//! - `cell-width-px` - Pixel width of one terminal column
//! - `log-level` - Default tracing level
//! - `display-mode` - "full" or "compact"
//!
//! ## state.kdl - Credentials
//!
//! - `auth-token` - Bearer token sent to the entity service
//!
//! `state.kdl` is written with 0600 permissions because it holds the token.
//!
//! The directory is `$TW_CONFIG_DIR` when set, otherwise `<config dir>/trackwise`.
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use kdl::KdlDocument;

use crate::{Error, Result};

pub use resolver::{
    API_URL_ENV, ConfigOverrides, Resolved, ResolvedConfig, TOKEN_ENV, ValueSource,
    resolve_config, resolve_config_with_env,
};
pub use schema::{
    CONFIG_FILE_MODE, STATE_FILE_MODE, TrackwiseConfig, TrackwiseState, mask_token,
};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "TW_CONFIG_DIR";

pub const CONFIG_FILE: &str = "config.kdl";
pub const STATE_FILE: &str = "state.kdl";

/// Directory holding config.kdl, state.kdl and TUI logs.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|d| d.join("trackwise"))
        .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))
}

fn read_document(path: &Path) -> Result<Option<KdlDocument>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let doc = text
        .parse::<KdlDocument>()
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    Ok(Some(doc))
}

fn write_document(path: &Path, doc: &KdlDocument, mode: u32) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        // Mode only applies on creation; tighten files that already existed.
        options.mode(mode);
        let mut file = options.open(path)?;
        file.set_permissions(fs::Permissions::from_mode(mode))?;
        file.write_all(doc.to_string().as_bytes())?;
    }
    #[cfg(not(unix))]
    {
        let _ = mode;
        options.open(path)?.write_all(doc.to_string().as_bytes())?;
    }
    Ok(())
}

/// Read config.kdl, defaulting when it does not exist.
pub fn read_config(dir: &Path) -> Result<TrackwiseConfig> {
    let path = dir.join(CONFIG_FILE);
    let Some(doc) = read_document(&path)? else {
        return Ok(TrackwiseConfig::default());
    };
    let config = TrackwiseConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

pub fn read_state(dir: &Path) -> Result<TrackwiseState> {
    match read_document(&dir.join(STATE_FILE))? {
        Some(doc) => Ok(TrackwiseState::from_kdl(&doc)),
        None => Ok(TrackwiseState::default()),
    }
}

pub fn write_config(dir: &Path, config: &TrackwiseConfig) -> Result<()> {
    write_document(&dir.join(CONFIG_FILE), &config.to_kdl(), CONFIG_FILE_MODE)
}

pub fn write_state(dir: &Path, state: &TrackwiseState) -> Result<()> {
    write_document(&dir.join(STATE_FILE), &state.to_kdl(), STATE_FILE_MODE)
}
