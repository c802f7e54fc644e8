//! CLI argument definitions for Trackwise.

#[cfg(feature = "serve")]
use std::path::PathBuf;

use clap::{Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TW_GIT_COMMIT"),
    ", built ",
    env!("TW_BUILD_TIMESTAMP"),
    ")"
);

/// Trackwise - navigate the client → program → project → usecase → userstory →
/// task → subtask hierarchy of the QA tracker.
///
/// Start with `tw browse` to explore interactively, or `tw resolve` for JSON.
#[derive(Parser, Debug)]
#[command(name = "tw")]
#[command(author, version, long_version = LONG_VERSION, about = "Hierarchy navigation for the Trackwise QA tracker", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Base URL of the entity service (overrides TW_API_URL and config.kdl)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log level for this invocation (overridden by TW_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the hierarchy type map (parent and child of every entity type)
    Types,

    /// Classify a viewport width and show the pane layout it gets
    Classify {
        /// Viewport width in pixels
        width: u32,
    },

    /// Resolve an entity with its parent, children and breadcrumb
    ///
    /// Give either TYPE and ID, or a route path with --path.
    Resolve {
        /// Entity type (client, program, project, usecase, userstory, task, subtask, bug, phase, user)
        #[arg(required_unless_present = "path", requires = "id")]
        entity_type: Option<String>,

        /// Entity ID
        id: Option<String>,

        /// Route path, e.g. /hierarchy/project/PR1 (or /hierarchy for the top level)
        #[arg(long, conflicts_with_all = ["entity_type", "id"])]
        path: Option<String>,
    },

    /// Browse the hierarchy interactively in the terminal
    #[cfg(feature = "tui")]
    Browse {
        /// Route path to open, e.g. /hierarchy/client/C1 (default: top level)
        path: Option<String>,
    },

    /// Serve a fixture file over the entity service HTTP API
    #[cfg(feature = "serve")]
    Serve {
        /// JSON fixture file ({"entities": [...]})
        #[arg(long)]
        fixture: PathBuf,

        /// Port to listen on
        #[arg(short, long, env = "TW_SERVE_PORT", default_value = "8080")]
        port: u16,

        /// Host address to bind to (use 0.0.0.0 for network access)
        #[arg(long, env = "TW_SERVE_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Require this bearer token on every request
        #[arg(long)]
        token: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings and where each one came from
    Show,

    /// Set a value in config.kdl
    Set {
        /// Configuration key (api-url, request-timeout-ms, resize-debounce-ms, cell-width-px, log-level, display-mode)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Store the entity service token in state.kdl
    SetToken {
        /// Bearer token
        token: String,
    },

    /// Remove the stored token
    ClearToken,
}
