//! Integration tests for command-line binding.
//!
//! These tests exercise the full pass order of the binder: configuration
//! files first, then `--@` overrides, then explicit options.

mod common;

use std::sync::Arc;

use common::{manager, write_fixture, Listener, Protocol};
use confman::options::{EnumOption, EnumSetOption, OptionDef, OptionRegistrar, Options, OptionsBinder};
use confman::Error;
use tempfile::TempDir;

// ============================================================================
// Options Trees
// ============================================================================

#[derive(Default)]
struct Simple {
    a: bool,
    b: i32,
    gamma: i32,
}

impl Options for Simple {
    fn register<'a>(&'a mut self, options: &mut OptionRegistrar<'a>) {
        options
            .option(OptionDef::new("alpha").short('a'), &mut self.a)
            .option(OptionDef::new("beta").short('b'), &mut self.b)
            .option(OptionDef::new("gamma"), &mut self.gamma);
    }
}

#[derive(Default)]
struct Left {
    baz: String,
}

impl Options for Left {
    fn register<'a>(&'a mut self, options: &mut OptionRegistrar<'a>) {
        options.option(OptionDef::new("baz"), &mut self.baz);
    }
}

#[derive(Default)]
struct Right {
    baz: i32,
}

impl Options for Right {
    fn register<'a>(&'a mut self, options: &mut OptionRegistrar<'a>) {
        options.option(OptionDef::new("baz"), &mut self.baz);
    }
}

#[derive(Default)]
struct Siblings {
    left: Left,
    right: Right,
}

impl Options for Siblings {
    fn register<'a>(&'a mut self, options: &mut OptionRegistrar<'a>) {
        options.group("left", &mut self.left).group("right", &mut self.right);
    }
}

#[derive(Default)]
struct Server {
    listener: Option<Arc<Listener>>,
    protocol: EnumOption<Protocol>,
    allowed: EnumSetOption<Protocol>,
    retries: i32,
}

impl Options for Server {
    fn register<'a>(&'a mut self, options: &mut OptionRegistrar<'a>) {
        options
            .option(
                OptionDef::new("listener").short('l').describe("listener component"),
                &mut self.listener,
            )
            .option(OptionDef::new("protocol").short('p'), &mut self.protocol)
            .option(OptionDef::new("allowed"), &mut self.allowed)
            .option(OptionDef::new("retries").short('r'), &mut self.retries);
    }
}

const CONFIG: &str = r"
properties:
  port: 8000
  retries: 2
components:
  - name: web
    type: Listener
    properties:
      port: ${port}
  - name: admin
    type: Listener
    properties:
      port: 9000
";

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_cluster_then_long_option() {
    let manager = manager();
    let mut simple = Simple::default();
    let rest = OptionsBinder::new(&manager)
        .bind(&mut simple, &["-ab", "7", "--gamma", "9"])
        .unwrap();

    assert!(simple.a);
    assert_eq!(simple.b, 7);
    assert_eq!(simple.gamma, 9);
    assert!(rest.is_empty());
}

#[test]
fn test_duplicate_long_name_in_sibling_groups() {
    let manager = manager();
    let mut siblings = Siblings::default();
    let err = OptionsBinder::new(&manager)
        .bind(&mut siblings, &["--baz", "1"])
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateOptionName { ref option } if option == "--baz"));

    // Rejected before parsing: even --help is not reached
    let err = OptionsBinder::new(&manager).bind(&mut siblings, &["--help"]).unwrap_err();
    assert!(!err.is_usage_request());
}

#[test]
fn test_usage_text_names_program_and_groups() {
    let manager = manager();
    let err = OptionsBinder::new(&manager)
        .program("server")
        .bind(&mut Server::default(), &["--usage"])
        .unwrap_err();
    let Error::UsageRequested { usage } = err else {
        panic!("expected usage request");
    };
    assert!(usage.starts_with("Usage: server"));
    assert!(usage.contains("-l, --listener <component<Listener>>"));
    assert!(usage.contains("listener component"));
}

// ============================================================================
// Configuration and Precedence
// ============================================================================

#[test]
fn test_config_file_components_bind_by_name() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(temp.path(), "server.yaml", CONFIG).display().to_string();
    let manager = manager();
    let mut server = Server::default();

    let rest = OptionsBinder::new(&manager)
        .bind(
            &mut server,
            &["--config-file", path.as_str(), "-l", "web", "input"],
        )
        .unwrap();

    assert_eq!(rest, vec!["input"]);
    let listener = server.listener.unwrap();
    assert_eq!(listener.name, "web");
    assert_eq!(listener.port, 8000);
}

#[test]
fn test_precedence_config_then_override_then_option() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(temp.path(), "server.yaml", CONFIG).display().to_string();
    let manager = manager();
    let mut server = Server::default();

    OptionsBinder::new(&manager)
        .bind(
            &mut server,
            &[
                "-c",
                path.as_str(),
                "--@port",
                "8100",
                "--@admin.port=9100",
                "--retries",
                "${retries}",
                "-r5",
                "--listener=web",
            ],
        )
        .unwrap();

    // Override beats the file
    assert_eq!(server.listener.as_ref().unwrap().port, 8100);
    assert_eq!(manager.get::<Listener>("admin").unwrap().port, 9100);
    // The last explicit option wins
    assert_eq!(server.retries, 5);
}

#[test]
fn test_enum_options() {
    let manager = manager();
    let mut server = Server::default();
    OptionsBinder::new(&manager)
        .bind(&mut server, &["-p", "QUIC", "--allowed", "udp,tcp"])
        .unwrap();

    assert_eq!(server.protocol.get(), Some(Protocol::Quic));
    assert_eq!(server.allowed.values(), &[Protocol::Tcp, Protocol::Udp]);

    let err = OptionsBinder::new(&manager)
        .bind(&mut Server::default(), &["-p", "quic"])
        .unwrap_err();
    assert!(matches!(err, Error::MalformedValue { .. }));
}

#[test]
fn test_component_option_type_checked() {
    let manager = manager();
    manager
        .add_component(
            confman::RawComponentRecord::new("relay", "Relay").with_property("target", "elsewhere"),
        )
        .unwrap();

    let err = OptionsBinder::new(&manager)
        .bind(&mut Server::default(), &["--listener", "relay"])
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    let err = OptionsBinder::new(&manager)
        .bind(&mut Server::default(), &["--listener", "nobody"])
        .unwrap_err();
    assert!(err.is_unknown_component());
}

#[test]
fn test_missing_config_file_fails_load() {
    let manager = manager();
    let err = OptionsBinder::new(&manager)
        .bind(&mut Simple::default(), &["-c", "/no/such/file.yaml"])
        .unwrap_err();
    assert!(err.is_config_io());
}
