//! Common test utilities for trackwise integration tests.
//!
//! Provides `TestEnv` for isolated config directories that don't touch the
//! user's real `~/.config/trackwise/`, and an in-process fixture server.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// Path of the sample fixture shipped with the crate.
pub fn fixture_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/fixture.json")
}

/// A test environment with an isolated config directory.
///
/// The `tw()` method returns a `Command` that sets `TW_CONFIG_DIR`
/// per-invocation and clears inherited `TW_*` variables, making tests
/// parallel-safe.
pub struct TestEnv {
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tw binary with an isolated config directory.
    pub fn tw(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tw"));
        cmd.env("TW_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("TW_API_URL");
        cmd.env_remove("TW_TOKEN");
        cmd.env_remove("TW_LOG");
        cmd
    }

    pub fn config_path(&self) -> &std::path::Path {
        self.config_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve `demos/fixture.json` on an ephemeral port, returning its base URL.
///
/// The server runs on its own thread for the rest of the test process.
#[cfg(feature = "serve")]
pub fn spawn_fixture_server(token: Option<&str>) -> String {
    use std::sync::Arc;
    use trackwise::server::{AppState, router};
    use trackwise::service::InMemoryEntityService;

    let service = InMemoryEntityService::load(&fixture_path()).unwrap();
    let state = AppState::new(Arc::new(service), token.map(str::to_string));
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router(state)).await.unwrap();
        });
    });

    let addr = rx.recv().unwrap();
    format!("http://{}", addr)
}
