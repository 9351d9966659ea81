//! Common test utilities for cardgen integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read the
//! user's `~/.config/cardgen/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with isolated directories.
///
/// Each `TestEnv` creates two temporary directories:
/// - `work_dir`: Holds the input exports and generated PDFs
/// - `config_dir`: System config directory (via `CARDGEN_CONFIG_DIR` env var)
///
/// The `cardgen()` method returns a `Command` that sets the environment
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the cardgen binary with isolated config.
    ///
    /// The viewer is never launched from tests.
    pub fn cardgen(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cardgen"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("CARDGEN_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("CARDGEN_CONFIG");
        cmd.env_remove("CARDGEN_LOG");
        cmd.arg("--no-open");
        cmd
    }

    /// Write an export file into the work directory.
    pub fn write_export(&self, name: &str, xml: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, xml).unwrap();
        path
    }

    /// Write the project config (`.cardgen.kdl`) next to the exports.
    pub fn write_project_config(&self, kdl: &str) {
        std::fs::write(self.work_dir.path().join(".cardgen.kdl"), kdl).unwrap();
    }

    /// Write the system config.
    pub fn write_system_config(&self, kdl: &str) {
        std::fs::write(self.config_dir.path().join("config.kdl"), kdl).unwrap();
    }

    /// Get the path to the work directory.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// One `<item>` element of a backlog export.
pub fn item(key: &str, summary: &str, assignee: &str) -> String {
    format!(
        "<item>\
           <key>{key}</key>\
           <summary>{summary}</summary>\
           <description>Something to do for {key}</description>\
           <priority>Major</priority>\
           <assignee>{assignee}</assignee>\
           <customfields><customfield>\
             <customfieldname>Rank</customfieldname>\
             <customfieldvalues><customfieldvalue>0|hzzzz7:</customfieldvalue></customfieldvalues>\
           </customfield></customfields>\
         </item>"
    )
}

/// A complete export with the given items.
pub fn export(items: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"0.92\"><channel><title>Backlog</title>{}</channel></rss>",
        items.concat()
    )
}

/// Parse stdout of a JSON-mode run.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}
