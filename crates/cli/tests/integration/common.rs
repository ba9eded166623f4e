//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary output directory and a command with no
/// context leaking in from the caller's environment.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Output directory for the cloud assembly.
  pub fn out_path(&self) -> PathBuf {
    self.temp.path().join("purestack.out")
  }

  /// Read and parse a JSON file from the output directory.
  pub fn read_json(&self, file: &str) -> Value {
    let path = self.out_path().join(file);
    let content = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&content).unwrap()
  }

  /// Get a pre-configured Command for the purestack binary.
  ///
  /// Runs inside the temp directory and clears:
  /// - `PURESTACK_VSN`, `PURESTACK_DOMAIN`: context overrides
  /// - `CDK_DEFAULT_ACCOUNT`, `CDK_DEFAULT_REGION`: target environment
  /// - `RUST_LOG`: so stderr only carries errors
  pub fn purestack_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("purestack");
    cmd.current_dir(self.temp.path());
    for var in ["PURESTACK_VSN", "PURESTACK_DOMAIN", "CDK_DEFAULT_ACCOUNT", "CDK_DEFAULT_REGION", "RUST_LOG"] {
      cmd.env_remove(var);
    }
    cmd
  }
}
