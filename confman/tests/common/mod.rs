//! Common test utilities for integration tests.
//!
//! Sample configurable types shared by the integration suites, plus helpers
//! for writing YAML fixtures to temporary directories.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use confman::{
    ComponentRef, ComponentSchema, ConfigEnum, ConfigurationManager, Configurable, ConfiguredProperties,
    ExportedProperties, PropertyDescriptor, PropertyValue, Result, ScalarKind, ValueKind,
};
use indexmap::IndexMap;
use url::Url;

/// Capability implemented by every front-end type.
pub const FRONTEND: &str = "Frontend";

/// Three free-text properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTriple {
    pub one: String,
    pub two: String,
    pub three: String,
}

impl Configurable for StringTriple {
    const TYPE_NAME: &'static str = "StringTriple";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::TYPE_NAME)
            .property(PropertyDescriptor::new("one", ScalarKind::String).mandatory())
            .property(PropertyDescriptor::new("two", ScalarKind::String).default_value("two"))
            .property(PropertyDescriptor::new("three", ScalarKind::String))
            .build()
    }

    fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self> {
        Ok(Self {
            one: props.require("one")?,
            two: props.take_or("two", String::new())?,
            three: props.take_or("three", String::new())?,
        })
    }

    fn export(&self, props: &mut ExportedProperties) {
        props
            .set("one", self.one.as_str())
            .set("two", self.two.as_str())
            .set("three", self.three.as_str());
    }
}

/// Wire protocol of a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Quic,
}

impl ConfigEnum for Protocol {
    const NAME: &'static str = "Protocol";
    const VARIANTS: &'static [&'static str] = &["TCP", "UDP", "QUIC"];

    fn from_variant(variant: &str) -> Option<Self> {
        match variant {
            "TCP" => Some(Self::Tcp),
            "UDP" => Some(Self::Udp),
            "QUIC" => Some(Self::Quic),
            _ => None,
        }
    }

    fn variant(self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
            Self::Quic => "QUIC",
        }
    }
}

/// A listening front end. Registered with the [`FRONTEND`] capability.
#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    pub name: String,
    pub port: i32,
    pub protocols: Vec<Protocol>,
    pub weight: f64,
}

impl Configurable for Listener {
    const TYPE_NAME: &'static str = "Listener";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::TYPE_NAME)
            .property(PropertyDescriptor::new("port", ScalarKind::Int).mandatory())
            .property(PropertyDescriptor::new(
                "protocols",
                ValueKind::EnumSetOf(confman::EnumType::of::<Protocol>()),
            ))
            .property(PropertyDescriptor::new("weight", ScalarKind::Double).default_value("1.0"))
            .name_sink("name")
            .build()
    }

    fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self> {
        Ok(Self {
            name: props.require("name")?,
            port: props.require("port")?,
            protocols: props.enum_set("protocols")?,
            weight: props.take_or("weight", 1.0)?,
        })
    }

    fn export(&self, props: &mut ExportedProperties) {
        props.set("port", self.port).set("weight", self.weight);
        props.set_value("protocols", confman::TypedValue::enum_set(self.protocols.iter().copied()));
    }
}

/// A forwarding front end. Registered with the [`FRONTEND`] capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relay {
    pub target: String,
}

impl Configurable for Relay {
    const TYPE_NAME: &'static str = "Relay";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::TYPE_NAME)
            .property(PropertyDescriptor::new("target", ScalarKind::String).mandatory())
            .build()
    }

    fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self> {
        Ok(Self {
            target: props.require("target")?,
        })
    }

    fn export(&self, props: &mut ExportedProperties) {
        props.set("target", self.target.as_str());
    }
}

/// Routes to front ends.
#[derive(Debug)]
pub struct Gateway {
    pub frontends: Vec<ComponentRef>,
    pub fallback: Option<Arc<Listener>>,
    pub headers: IndexMap<String, String>,
    pub home: Option<Url>,
}

impl Configurable for Gateway {
    const TYPE_NAME: &'static str = "Gateway";

    fn schema() -> ComponentSchema {
        ComponentSchema::builder(Self::TYPE_NAME)
            .property(PropertyDescriptor::new(
                "frontends",
                ValueKind::ArrayOf(ScalarKind::component(FRONTEND)),
            ))
            .property(PropertyDescriptor::new("fallback", ScalarKind::component(Listener::TYPE_NAME)))
            .property(PropertyDescriptor::new("headers", ValueKind::MapOf(ScalarKind::String)))
            .property(PropertyDescriptor::new("home", ScalarKind::Url))
            .build()
    }

    fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self> {
        Ok(Self {
            frontends: props.take_or("frontends", Vec::new())?,
            fallback: props.component("fallback")?,
            headers: props.take_or("headers", IndexMap::new())?,
            home: props.take("home")?,
        })
    }

    fn export(&self, props: &mut ExportedProperties) {
        props.set("frontends", self.frontends.clone());
        if let Some(fallback) = &self.fallback {
            props.set("fallback", Arc::clone(fallback));
        }
        props.set("headers", self.headers.clone());
        props.set_opt("home", self.home.clone());
    }
}

/// A manager with every sample type registered.
pub fn manager() -> ConfigurationManager {
    let manager = ConfigurationManager::new();
    manager.register::<StringTriple>().unwrap();
    manager.register_as::<Listener>(&[FRONTEND]).unwrap();
    manager.register_as::<Relay>(&[FRONTEND]).unwrap();
    manager.register::<Gateway>().unwrap();
    manager
}

/// Writes `content` to `dir/name` and returns the path.
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// The raw properties of a record as plain text, for comparisons.
pub fn raw_snapshot(manager: &ConfigurationManager, name: &str) -> BTreeMap<String, String> {
    manager
        .record(name)
        .unwrap()
        .properties()
        .map(|(k, v): (&str, &PropertyValue)| (k.to_string(), v.to_string()))
        .collect()
}
