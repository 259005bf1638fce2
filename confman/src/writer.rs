//! Write models: sinks for a saved registry.
//!
//! [`ConfigurationManager::save`](crate::ConfigurationManager::save) drives a
//! [`WriteModel`] through a fixed sequence of calls:
//!
//! ```text
//! start_document
//! write_global_properties
//! start_components
//! write_component*   (one call per saved record)
//! end_components
//! end_document
//! ```
//!
//! [`YamlWriter`] renders the document shape read by
//! [`YamlLoader`](crate::loader::YamlLoader), so a saved registry can be
//! loaded again.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::document::{property_to_value, ComponentEntry, ConfigDocument};
use crate::error::{Error, Result};
use crate::property::PropertyValue;
use crate::record::LegacyFlags;

/// Identity and flags of a component being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentAttributes {
    /// The component name.
    pub name: String,
    /// The component type.
    pub type_name: String,
    /// Round-trip flags.
    pub legacy: LegacyFlags,
}

/// A sink for a saved registry.
pub trait WriteModel {
    /// Opens the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigWriteError`] if the sink fails.
    fn start_document(&mut self) -> Result<()>;

    /// Writes the explicit global properties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigWriteError`] if the sink fails.
    fn write_global_properties(&mut self, properties: &IndexMap<String, String>) -> Result<()>;

    /// Opens the component section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigWriteError`] if the sink fails.
    fn start_components(&mut self) -> Result<()>;

    /// Writes one component with its raw properties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigWriteError`] if the sink fails.
    fn write_component(
        &mut self,
        attributes: &ComponentAttributes,
        properties: &IndexMap<String, PropertyValue>,
    ) -> Result<()>;

    /// Closes the component section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigWriteError`] if the sink fails.
    fn end_components(&mut self) -> Result<()>;

    /// Closes the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigWriteError`] if the sink fails.
    fn end_document(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Document,
    Components,
    Closed,
}

/// Builds a YAML document from write-model calls.
///
/// # Examples
///
/// ```
/// use confman::writer::{ComponentAttributes, WriteModel, YamlWriter};
/// use confman::PropertyValue;
/// use indexmap::IndexMap;
///
/// let mut writer = YamlWriter::new();
/// writer.start_document().unwrap();
/// writer.write_global_properties(&IndexMap::new()).unwrap();
/// writer.start_components().unwrap();
/// let mut props = IndexMap::new();
/// props.insert("one".to_string(), PropertyValue::from("foo"));
/// writer
///     .write_component(
///         &ComponentAttributes {
///             name: "a".to_string(),
///             type_name: "StringTriple".to_string(),
///             legacy: Default::default(),
///         },
///         &props,
///     )
///     .unwrap();
/// writer.end_components().unwrap();
/// writer.end_document().unwrap();
///
/// assert!(writer.into_string().unwrap().contains("type: StringTriple"));
/// ```
#[derive(Debug, Clone)]
pub struct YamlWriter {
    document: ConfigDocument,
    stage: Stage,
}

impl Default for YamlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl YamlWriter {
    /// An empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: ConfigDocument::default(),
            stage: Stage::Idle,
        }
    }

    /// The document built so far.
    #[must_use]
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Renders the finished document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigWriteError`] if the document was not closed or
    /// cannot be serialized.
    pub fn into_string(self) -> Result<String> {
        if self.stage != Stage::Closed {
            return Err(write_error("document was not closed"));
        }
        serde_yaml::to_string(&self.document).map_err(|e| write_error(format!("failed to serialize: {e}")))
    }

    /// Renders the finished document into `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigWriteError`] if rendering fails and
    /// [`Error::Io`] if the file cannot be written.
    pub fn write_to(self, path: &Path) -> Result<()> {
        let text = self.into_string()?;
        fs::write(path, text)?;
        Ok(())
    }

    fn expect_stage(&self, expected: Stage, call: &str) -> Result<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(write_error(format!("{call} called out of order")))
        }
    }
}

impl WriteModel for YamlWriter {
    fn start_document(&mut self) -> Result<()> {
        self.expect_stage(Stage::Idle, "start_document")?;
        self.stage = Stage::Document;
        Ok(())
    }

    fn write_global_properties(&mut self, properties: &IndexMap<String, String>) -> Result<()> {
        self.expect_stage(Stage::Document, "write_global_properties")?;
        for (name, value) in properties {
            self.document
                .properties
                .insert(name.clone(), serde_yaml::Value::String(value.clone()));
        }
        Ok(())
    }

    fn start_components(&mut self) -> Result<()> {
        self.expect_stage(Stage::Document, "start_components")?;
        self.stage = Stage::Components;
        Ok(())
    }

    fn write_component(
        &mut self,
        attributes: &ComponentAttributes,
        properties: &IndexMap<String, PropertyValue>,
    ) -> Result<()> {
        self.expect_stage(Stage::Components, "write_component")?;
        self.document.components.push(ComponentEntry {
            name: attributes.name.clone(),
            type_name: attributes.type_name.clone(),
            properties: properties
                .iter()
                .map(|(k, v)| (k.clone(), property_to_value(v)))
                .collect(),
            serialized_form: attributes.legacy.serialized_form.clone(),
            exportable: attributes.legacy.exportable,
            importable: attributes.legacy.importable,
            leasable: attributes.legacy.leasable,
        });
        Ok(())
    }

    fn end_components(&mut self) -> Result<()> {
        self.expect_stage(Stage::Components, "end_components")?;
        self.stage = Stage::Document;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.expect_stage(Stage::Document, "end_document")?;
        self.stage = Stage::Closed;
        Ok(())
    }
}

fn write_error(reason: impl Into<String>) -> Error {
    Error::ConfigWriteError {
        reason: reason.into(),
    }
}
