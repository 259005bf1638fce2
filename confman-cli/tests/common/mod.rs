//! Fixtures for running the `confman` binary.
//!
//! Each test gets its own temporary working directory and a command whose
//! `CONFMAN_*` environment variables are cleared.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A document with globals, a reference chain and a list of references.
pub const SERVICES: &str = r"
properties:
  base: 8000
  host: example.org
  origin: https://${host}
components:
  - name: web
    type: Listener
    properties:
      port: ${base}
      protocols: [tcp, udp]
  - name: admin
    type: Listener
    properties:
      port: 9000
  - name: gw
    type: Gateway
    properties:
      frontends: [web, admin, {type: Listener}]
      headers:
        X-Origin: ${origin}
";

/// A document whose second component refers to an undefined global.
pub const BROKEN: &str = r"
components:
  - name: fine
    type: Listener
    properties:
      port: 1
  - name: broken
    type: Listener
    properties:
      port: ${missing}
";

/// Test environment with an isolated temporary directory.
pub struct TestEnv {
    /// Dropped with the environment.
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Working directory of every command.
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// A fresh, empty working directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Get a bare command builder with no configuration flags.
    ///
    /// Environment variables read by confman are cleared so the host
    /// environment cannot leak into a test.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("confman").expect("Failed to find confman binary");
        cmd.env_remove("CONFMAN_CONFIG")
            .env_remove("CONFMAN_RESOURCE_PATH")
            .env_remove("CONFMAN_LOG_MODE")
            .env_remove("CONFMAN_OUTPUT_FORMAT")
            .current_dir(&self.temp_path);
        cmd
    }

    /// Get a command builder that loads the given fixture files.
    pub fn command(&self, fixtures: &[&Path]) -> Command {
        let mut cmd = self.command_bare();
        let locations: Vec<String> = fixtures.iter().map(|p| p.display().to_string()).collect();
        cmd.arg("--config-file").arg(locations.join(","));
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a fixture file and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    /// Run a command and return its stdout, asserting success.
    pub fn stdout(&self, mut cmd: Command) -> String {
        let output = cmd.output().expect("Failed to run confman");
        assert!(
            output.status.success(),
            "confman failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("Invalid UTF-8 in output")
    }
}

/// Parse a dumped document and return its component names in order.
#[allow(dead_code)]
pub fn component_names(yaml: &str) -> Vec<String> {
    let document: serde_yaml::Value = serde_yaml::from_str(yaml).expect("dump is not YAML");
    document["components"]
        .as_sequence()
        .map(|components| {
            components
                .iter()
                .filter_map(|c| c["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
