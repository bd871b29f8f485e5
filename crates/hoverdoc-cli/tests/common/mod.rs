#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// A scratch directory used as cwd, HOME and config home so no real
/// `hoverdoc.toml` leaks into a test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create test workspace"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` inside the workspace.
    pub fn file(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("failed to write fixture");
        path
    }

    /// Create a configured `hoverdoc` command running inside the workspace.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hoverdoc"));
        cmd.timeout(CMD_TIMEOUT);
        cmd.current_dir(self.path());
        cmd.env("HOME", self.path());
        cmd.env("XDG_CONFIG_HOME", self.path());
        cmd.env_remove("HOVERDOC_KB");
        cmd.env_remove("HOVERDOC_FENCE_MARKER");
        cmd.env_remove("HOVERDOC_PINNED");
        cmd.env("NO_COLOR", "1");
        cmd
    }
}
