//! Raw component records.
//!
//! A [`RawComponentRecord`] is exactly what a configuration source said
//! about one component: its name, its type and its unresolved property
//! values. Records are never validated here; binding to a schema happens
//! when a property sheet is built.

use indexmap::IndexMap;

use crate::property::PropertyValue;

/// Attributes kept only so they survive a load/save round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyFlags {
    /// Path of a serialized instance to restore from, if any.
    pub serialized_form: Option<String>,
    /// Whether the component may be exported to other processes.
    pub exportable: bool,
    /// Whether the component is provided by another process.
    ///
    /// Importable records are skipped by type lookups.
    pub importable: bool,
    /// Whether the component may be leased.
    pub leasable: bool,
}

impl LegacyFlags {
    /// Whether every flag has its default value.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

/// Unresolved configuration of one named component.
///
/// # Examples
///
/// ```
/// use confman::{PropertyValue, RawComponentRecord};
///
/// let record = RawComponentRecord::new("frontend", "Frontend")
///     .with_property("sampleRate", "16000")
///     .with_property("stages", PropertyValue::list(["mic", "filter"]));
///
/// assert_eq!(record.get("sampleRate").and_then(PropertyValue::as_scalar), Some("16000"));
/// assert_eq!(record.property_names().collect::<Vec<_>>(), vec!["sampleRate", "stages"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComponentRecord {
    name: String,
    type_name: String,
    properties: IndexMap<String, PropertyValue>,
    legacy: LegacyFlags,
}

impl RawComponentRecord {
    /// Creates a record with no properties.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            properties: IndexMap::new(),
            legacy: LegacyFlags::default(),
        }
    }

    /// Builder form of [`RawComponentRecord::set_property`].
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Sets a raw property value, replacing any previous one.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(name.into(), value.into());
    }

    /// The raw value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Removes a raw property, keeping the order of the others.
    pub fn remove_property(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.shift_remove(name)
    }

    /// Names of the raw properties in source order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Raw properties in source order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The raw property map.
    #[must_use]
    pub fn property_map(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    /// The component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Round-trip attributes.
    #[must_use]
    pub fn legacy(&self) -> &LegacyFlags {
        &self.legacy
    }

    /// Mutable round-trip attributes.
    pub fn legacy_mut(&mut self) -> &mut LegacyFlags {
        &mut self.legacy
    }

    /// Builder form of [`RawComponentRecord::legacy_mut`].
    #[must_use]
    pub fn with_legacy(mut self, legacy: LegacyFlags) -> Self {
        self.legacy = legacy;
        self
    }
}
