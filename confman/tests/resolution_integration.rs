//! Integration tests for substitution and value coercion.
//!
//! These tests drive lookups end to end: YAML text is parsed, absorbed into
//! a manager with the sample types from `common`, and the resulting
//! instances are checked field by field.

mod common;

use common::{manager, Gateway, Listener, Protocol, StringTriple};
use confman::{ConfigurationManager, Error, RawComponentRecord, YamlLoader};

// ============================================================================
// Test Utilities
// ============================================================================

fn load(yaml: &str) -> ConfigurationManager {
    let manager = manager();
    manager.absorb(YamlLoader::parse_str(yaml, "test.yaml").unwrap());
    manager
}

// ============================================================================
// Global Substitution
// ============================================================================

#[test]
fn test_string_triple_substitutes_global() {
    let manager = load(
        r"
properties:
  X: foo
components:
  - name: triple
    type: StringTriple
    properties:
      one: ${X}
      three: ${X}-${X}
",
    );

    let triple = manager.get::<StringTriple>("triple").unwrap();
    assert_eq!(triple.one, "foo");
    assert_eq!(triple.two, "two");
    assert_eq!(triple.three, "foo-foo");
}

#[test]
fn test_reference_chain_resolves() {
    let manager = load(
        r"
properties:
  a: ${b}
  b: ${c}
  c: end
components:
  - name: t
    type: StringTriple
    properties:
      one: <${a}>
",
    );
    assert_eq!(manager.get::<StringTriple>("t").unwrap().one, "<end>");
}

#[test]
fn test_self_reference_is_cyclic() {
    let manager = load(
        r"
properties:
  loop: ${loop}
components:
  - name: t
    type: StringTriple
    properties:
      one: ${loop}
",
    );

    let err = manager.lookup("t", true).unwrap_err();
    match err {
        Error::CyclicGlobalProperty {
            component,
            property,
            cycle,
        } => {
            assert_eq!(component, "t");
            assert_eq!(property, "one");
            assert_eq!(cycle, vec!["loop", "loop"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_global_names_reference() {
    let manager = load(
        r"
components:
  - name: t
    type: StringTriple
    properties:
      one: ${missing}
",
    );
    let err = manager.lookup("t", true).unwrap_err();
    assert!(matches!(err, Error::UnknownGlobalProperty { ref name, .. } if name == "missing"));
}

#[test]
fn test_distinguished_working_dir() {
    let manager = manager();
    manager
        .add_component(RawComponentRecord::new("t", "StringTriple").with_property("one", "${user.dir}"))
        .unwrap();

    let expected = std::env::current_dir().unwrap().display().to_string();
    assert_eq!(manager.get::<StringTriple>("t").unwrap().one, expected);
}

#[test]
fn test_explicit_global_shadows_distinguished() {
    let manager = manager();
    manager.set_global_property("user.name", "override");
    manager
        .add_component(RawComponentRecord::new("t", "StringTriple").with_property("one", "${user.name}"))
        .unwrap();
    assert_eq!(manager.get::<StringTriple>("t").unwrap().one, "override");
}

// ============================================================================
// Coercion
// ============================================================================

#[test]
fn test_scalar_enum_set_and_defaults() {
    let manager = load(
        r"
properties:
  base: 8000
components:
  - name: web
    type: Listener
    properties:
      port: ${base}
      protocols: [quic, tcp, QUIC]
",
    );

    let web = manager.get::<Listener>("web").unwrap();
    assert_eq!(web.name, "web");
    assert_eq!(web.port, 8000);
    assert_eq!(web.protocols, vec![Protocol::Tcp, Protocol::Quic]);
    assert!((web.weight - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_invalid_enum_literal() {
    let manager = load(
        r"
components:
  - name: web
    type: Listener
    properties:
      port: 1
      protocols: [tcp, carrier-pigeon]
",
    );
    let err = manager.lookup("web", true).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidEnumValue { ref enum_name, ref value, .. }
            if enum_name == "Protocol" && value == "carrier-pigeon"
    ));
}

#[test]
fn test_malformed_scalar_reports_location() {
    let manager = load(
        r"
components:
  - name: web
    type: Listener
    properties:
      port: eighty
",
    );
    let err = manager.lookup("web", true).unwrap_err();
    match err {
        Error::MalformedValue {
            component,
            property,
            value,
            ..
        } => {
            assert_eq!(component, "web");
            assert_eq!(property, "port");
            assert_eq!(value, "eighty");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_mandatory_property() {
    let manager = load(
        r"
properties:
  empty: ''
components:
  - name: web
    type: Listener
    properties:
      port: ${empty}
",
    );
    let err = manager.lookup("web", true).unwrap_err();
    assert!(matches!(err, Error::MissingMandatoryProperty { ref property, .. } if property == "port"));
}

#[test]
fn test_undeclared_property_rejected_at_binding() {
    let manager = load(
        r"
components:
  - name: t
    type: StringTriple
    properties:
      one: a
      four: b
",
    );
    let err = manager.lookup("t", true).unwrap_err();
    assert!(matches!(err, Error::UnknownPropertyInConfig { ref property, .. } if property == "four"));
}

#[test]
fn test_array_with_type_reference_expands_in_order() {
    let manager = load(
        r"
components:
  - name: x
    type: Relay
    properties:
      target: upstream
  - name: e1
    type: Listener
    properties:
      port: 1
  - name: e2
    type: Listener
    properties:
      port: 2
  - name: gw
    type: Gateway
    properties:
      frontends: [x, {type: Listener}]
",
    );

    let gateway = manager.get::<Gateway>("gw").unwrap();
    assert_eq!(gateway.frontends.len(), 3);
    for (instance, name) in gateway.frontends.iter().zip(["x", "e1", "e2"]) {
        let expected = manager.lookup(name, true).unwrap();
        assert!(confman::property::same_component(instance, &expected), "{name}");
    }
}

#[test]
fn test_component_reference_type_checked() {
    let manager = load(
        r"
components:
  - name: t
    type: StringTriple
    properties:
      one: a
  - name: gw
    type: Gateway
    properties:
      frontends: [t]
",
    );
    let err = manager.lookup("gw", true).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { ref property, .. } if property == "frontends"));
}

#[test]
fn test_map_and_url_values() {
    let manager = load(
        r"
properties:
  host: example.org
components:
  - name: gw
    type: Gateway
    properties:
      headers:
        X-Origin: ${host}
        X-Mode: test
      home: https://${host}/status
",
    );

    let gateway = manager.get::<Gateway>("gw").unwrap();
    let headers: Vec<_> = gateway.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(headers, vec![("X-Origin", "example.org"), ("X-Mode", "test")]);
    assert_eq!(
        gateway.home.as_ref().map(url::Url::as_str),
        Some("https://example.org/status")
    );
    assert!(gateway.fallback.is_none());
}
