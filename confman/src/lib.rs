#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # confman
//!
//! A library for building named, configurable components from layered
//! configuration.
//!
//! Configuration arrives as raw string records (from YAML files, command-line
//! overrides or code). Each record names a component type whose
//! [`ComponentSchema`] declares typed properties. Looking a component up
//! substitutes `${global}` references, coerces every raw value to its
//! declared kind, resolves references to other components and constructs
//! the instance through [`Configurable::configure`].
//!
//! ## Core Types
//!
//! - [`ConfigurationManager`]: the registry of named components and globals
//! - [`Configurable`] and [`ComponentSchema`]: how a type declares its properties
//! - [`GlobalPropertyTable`]: `${name}` substitution with cycle detection
//! - [`ValueCoercer`]: raw text to [`TypedValue`] for every [`ValueKind`]
//! - [`options::OptionsBinder`]: command-line binding with config files and overrides
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use confman::{
//!     ComponentSchema, ConfigurationManager, Configurable, ConfiguredProperties,
//!     ExportedProperties, PropertyDescriptor, Result, ScalarKind, YamlLoader,
//! };
//!
//! struct Listener {
//!     port: i32,
//! }
//!
//! impl Configurable for Listener {
//!     const TYPE_NAME: &'static str = "Listener";
//!
//!     fn schema() -> ComponentSchema {
//!         ComponentSchema::builder(Self::TYPE_NAME)
//!             .property(PropertyDescriptor::new("port", ScalarKind::Int).mandatory())
//!             .build()
//!     }
//!
//!     fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self> {
//!         Ok(Self { port: props.require("port")? })
//!     }
//!
//!     fn export(&self, props: &mut ExportedProperties) {
//!         props.set("port", self.port);
//!     }
//! }
//!
//! let yaml = "
//! properties:
//!   base: 8000
//! components:
//!   - name: http
//!     type: Listener
//!     properties:
//!       port: ${base}
//! ";
//!
//! let manager = ConfigurationManager::new();
//! manager.register::<Listener>().unwrap();
//! manager.absorb(YamlLoader::parse_str(yaml, "inline").unwrap());
//!
//! assert_eq!(manager.get::<Listener>("http").unwrap().port, 8000);
//! ```

pub mod coerce;
pub mod component;
pub mod document;
pub mod error;
pub mod globals;
pub mod loader;
pub mod logging;
pub mod manager;
pub mod options;
pub mod property;
pub mod record;
pub mod schema;
pub mod sheet;
pub mod writer;

// Re-export key types at crate root for convenience
pub use coerce::{parse_scalar, ValueCoercer};
pub use component::{
    downcast, Component, ComponentRef, Configurable, ConfiguredProperties, ExportedProperties,
};
pub use error::{BoxError, Error, Result};
pub use globals::{DistinguishedProperty, GlobalPropertyTable};
pub use loader::{ConfigLoader, LoadedConfig, LocationResolver, YamlLoader};
pub use logging::{init_logger, LogLevel, Logger};
pub use manager::{ConfigurationManager, SaveScope, WeakManager};
pub use property::{
    EnumValue, FromTypedValue, ListItem, PropertyValue, SeededRandom, TypedValue,
};
pub use record::{LegacyFlags, RawComponentRecord};
pub use schema::{
    ComponentSchema, ConfigEnum, EnumType, PropertyDescriptor, ScalarKind, SchemaBuilder,
    TypeEntry, TypeRegistry, ValueKind,
};
pub use sheet::PropertySheet;
pub use writer::{ComponentAttributes, WriteModel, YamlWriter};
