//! Component schemas.
//!
//! A [`ComponentSchema`] is the explicit, per-type description of the
//! properties a configurable type accepts. Schemas are built once with
//! [`ComponentSchema::builder`] and validated when the type is registered
//! in a [`TypeRegistry`].
//!
//! # Examples
//!
//! ```
//! use confman::schema::{ComponentSchema, PropertyDescriptor, ScalarKind};
//!
//! let schema = ComponentSchema::builder("Decoder")
//!     .property(PropertyDescriptor::new("beamWidth", ScalarKind::Int).mandatory())
//!     .property(PropertyDescriptor::new("verbose", ScalarKind::Bool).default_value("false"))
//!     .name_sink("name")
//!     .build();
//!
//! assert!(schema.validate().is_ok());
//! assert!(schema.property("beamWidth").unwrap().is_mandatory());
//! ```

pub mod kind;
pub mod registry;

pub use kind::{ConfigEnum, EnumType, ScalarKind, ValueKind, ANY_COMPONENT};
pub use registry::{TypeEntry, TypeRegistry};

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::property::PropertyValue;

/// Declaration of one schema property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    name: String,
    kind: ValueKind,
    mandatory: bool,
    default: Option<PropertyValue>,
    redact: bool,
    description: Option<String>,
}

impl PropertyDescriptor {
    /// An optional property of the given kind.
    pub fn new(name: impl Into<String>, kind: impl Into<ValueKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            mandatory: false,
            default: None,
            redact: false,
            description: None,
        }
    }

    /// Marks the property mandatory.
    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Raw value used when the record does not set the property.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Omits the raw value when the registry is saved.
    #[must_use]
    pub fn redact(mut self) -> Self {
        self.redact = true;
        self
    }

    /// Free-form description of the property.
    #[must_use]
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// The property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared kind.
    #[must_use]
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Whether a value is required.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// The default raw value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&PropertyValue> {
        self.default.as_ref()
    }

    /// Whether the value is omitted on save.
    #[must_use]
    pub fn is_redacted(&self) -> bool {
        self.redact
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Immutable description of a configurable type.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSchema {
    type_name: String,
    properties: IndexMap<String, PropertyDescriptor>,
    duplicates: Vec<String>,
    name_sink: Option<String>,
    manager_sink: Option<String>,
}

impl ComponentSchema {
    /// Starts a schema for `type_name`.
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                type_name: type_name.into(),
                properties: IndexMap::new(),
                duplicates: Vec::new(),
                name_sink: None,
                manager_sink: None,
            },
        }
    }

    /// The type this schema describes.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Looks up a declared property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Whether `name` is a declared property.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.values()
    }

    /// Field receiving the instance's registry name, if any.
    #[must_use]
    pub fn name_sink(&self) -> Option<&str> {
        self.name_sink.as_deref()
    }

    /// Field receiving a handle to the owning registry, if any.
    #[must_use]
    pub fn manager_sink(&self) -> Option<&str> {
        self.manager_sink.as_deref()
    }

    /// Checks the schema contract.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if a property is declared twice, the
    /// two sinks share a field, or a sink coincides with a declared property.
    pub fn validate(&self) -> Result<()> {
        if self.type_name.trim().is_empty() {
            return Err(self.invalid("type name cannot be empty"));
        }

        if let Some(dup) = self.duplicates.first() {
            return Err(self.invalid(format!("property '{dup}' is declared twice")));
        }

        if let (Some(name), Some(manager)) = (&self.name_sink, &self.manager_sink) {
            if name == manager {
                return Err(self.invalid(format!(
                    "field '{name}' cannot be both name sink and manager sink"
                )));
            }
        }

        for sink in [&self.name_sink, &self.manager_sink].into_iter().flatten() {
            if self.declares(sink) {
                return Err(self.invalid(format!(
                    "sink field '{sink}' is also a declared property"
                )));
            }
        }

        for desc in self.properties() {
            if desc.name().is_empty() {
                return Err(self.invalid("property names cannot be empty"));
            }
            if desc.is_redacted() && desc.kind().refers_to_components() {
                return Err(self.invalid(format!(
                    "component reference '{}' cannot be redacted",
                    desc.name()
                )));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::InvalidSchema {
            type_name: self.type_name.clone(),
            reason: reason.into(),
        }
    }
}

/// Builder returned by [`ComponentSchema::builder`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: ComponentSchema,
}

impl SchemaBuilder {
    /// Declares a property.
    #[must_use]
    pub fn property(mut self, descriptor: PropertyDescriptor) -> Self {
        let name = descriptor.name().to_string();
        if self.schema.properties.contains_key(&name) {
            self.schema.duplicates.push(name);
        } else {
            self.schema.properties.insert(name, descriptor);
        }
        self
    }

    /// Declares the field that receives the instance name.
    #[must_use]
    pub fn name_sink(mut self, field: impl Into<String>) -> Self {
        self.schema.name_sink = Some(field.into());
        self
    }

    /// Declares the field that receives the registry handle.
    #[must_use]
    pub fn manager_sink(mut self, field: impl Into<String>) -> Self {
        self.schema.manager_sink = Some(field.into());
        self
    }

    /// Finishes the schema. Validation happens on registration.
    #[must_use]
    pub fn build(self) -> ComponentSchema {
        self.schema
    }
}
