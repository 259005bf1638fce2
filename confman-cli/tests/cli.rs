//! Integration tests for the command-line surface.
//!
//! Covers help and version output, shell completions, and the global
//! options shared by every subcommand.

mod common;

use common::{component_names, TestEnv, SERVICES};
use predicates::prelude::*;

// ============================================================================
// Help and Version
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    let env = TestEnv::new();
    let stdout = env.stdout({
        let mut cmd = env.command_bare();
        cmd.arg("--help");
        cmd
    });
    for command in ["list", "show", "resolve", "check", "dump", "rename", "remove", "completions"] {
        assert!(stdout.contains(command), "{command} missing from help");
    }
    assert!(stdout.contains("--config-file"));
}

#[test]
fn test_version() {
    let env = TestEnv::new();
    env.command_bare()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("confman "));
}

#[test]
fn test_completions_bash() {
    let env = TestEnv::new();
    env.command_bare()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("confman"))
        .stderr(predicate::str::contains("# Generating bash completion script"));
}

#[test]
fn test_completions_quiet_omits_hints() {
    let env = TestEnv::new();
    env.command_bare()
        .args(["--quiet", "completions", "zsh"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// ============================================================================
// Global Options
// ============================================================================

#[test]
fn test_later_locations_win() {
    let env = TestEnv::new();
    let base = env.write("base.yaml", SERVICES);
    let overlay = env.write(
        "overlay.yaml",
        "properties:\n  base: 6000\ncomponents:\n  - name: extra\n    type: Relay\n    properties:\n      target: ${host}\n",
    );

    env.command(&[&base, &overlay])
        .args(["resolve", "${base}"])
        .assert()
        .success()
        .stdout("6000\n");

    let dumped = env.stdout({
        let mut cmd = env.command(&[&base, &overlay]);
        cmd.arg("dump");
        cmd
    });
    assert_eq!(component_names(&dumped), vec!["web", "admin", "gw", "extra"]);
}

#[test]
fn test_config_from_environment() {
    let env = TestEnv::new();
    let config = env.write("services.yaml", SERVICES);

    env.command_bare()
        .env("CONFMAN_CONFIG", &config)
        .args(["resolve", "${host}"])
        .assert()
        .success()
        .stdout("example.org\n");
}

#[test]
fn test_relative_location_from_resource_path() {
    let env = TestEnv::new();
    let dir = env.path().join("conf");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("services.yaml"), SERVICES).unwrap();

    env.command_bare()
        .env("CONFMAN_RESOURCE_PATH", &dir)
        .args(["--config-file", "services.yaml", "resolve", "${base}"])
        .assert()
        .success()
        .stdout("8000\n");
}

#[test]
fn test_set_after_subcommand() {
    let env = TestEnv::new();
    let config = env.write("services.yaml", SERVICES);

    env.command(&[&config])
        .args(["show", "web", "--set", "base=1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("= 1234"));
}

#[test]
fn test_set_global_referenced_by_another() {
    let env = TestEnv::new();
    let config = env.write("services.yaml", SERVICES);

    env.command(&[&config])
        .args(["--set", "host=internal", "resolve", "${origin}"])
        .assert()
        .success()
        .stdout("https://internal\n");
}

#[test]
fn test_set_list_property() {
    let env = TestEnv::new();
    let config = env.write("services.yaml", SERVICES);

    // Without a registered type the value stays a single scalar
    env.command(&[&config])
        .args(["--set", "web.protocols=quic", "--quiet", "show", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("protocols = quic"));
}
