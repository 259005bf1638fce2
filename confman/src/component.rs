//! Configurable components.
//!
//! A type becomes configurable by implementing [`Configurable`]: it supplies
//! its schema, a constructor that receives already-coerced property values,
//! and an export method that reports its current property values (used to
//! import live objects back into a registry).
//!
//! # Examples
//!
//! ```
//! use confman::{
//!     ComponentSchema, Configurable, ConfiguredProperties, ExportedProperties,
//!     PropertyDescriptor, Result, ScalarKind,
//! };
//!
//! #[derive(Debug)]
//! struct Greeter {
//!     greeting: String,
//!     repeat: i32,
//! }
//!
//! impl Configurable for Greeter {
//!     const TYPE_NAME: &'static str = "Greeter";
//!
//!     fn schema() -> ComponentSchema {
//!         ComponentSchema::builder(Self::TYPE_NAME)
//!             .property(PropertyDescriptor::new("greeting", ScalarKind::String).mandatory())
//!             .property(PropertyDescriptor::new("repeat", ScalarKind::Int))
//!             .build()
//!     }
//!
//!     fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self> {
//!         Ok(Self {
//!             greeting: props.require("greeting")?,
//!             repeat: props.take_or("repeat", 1)?,
//!         })
//!     }
//!
//!     fn export(&self, props: &mut ExportedProperties) {
//!         props.set("greeting", self.greeting.as_str()).set("repeat", self.repeat);
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{BoxError, Error, Result};
use crate::manager::{ConfigurationManager, WeakManager};
use crate::property::{EnumValue, FromTypedValue, TypedValue};
use crate::schema::{ComponentSchema, ConfigEnum};

/// A type whose instances are built and populated by the engine.
pub trait Configurable: Any + Send + Sync + Sized {
    /// Type identifier used in configuration records.
    const TYPE_NAME: &'static str;

    /// The property schema of this type.
    fn schema() -> ComponentSchema;

    /// Builds an instance from coerced property values.
    ///
    /// Optional properties that were not configured are absent from
    /// `props`; the implementation keeps its own default for them.
    ///
    /// # Errors
    ///
    /// Returns an error if a value has an unexpected shape.
    fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self>;

    /// Hook run once the instance is fully configured.
    ///
    /// # Errors
    ///
    /// Any error is reported as [`Error::PostConfigFailure`].
    fn post_configure(&mut self) -> std::result::Result<(), BoxError> {
        Ok(())
    }

    /// Reports current property values, keyed by declared property name.
    fn export(&self, props: &mut ExportedProperties);
}

/// Object-safe view of a configured instance.
pub trait Component: Any + Send + Sync {
    /// The registered type name.
    fn component_type(&self) -> &'static str;

    /// Current property values.
    fn export_properties(&self) -> ExportedProperties;

    /// Borrowing downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Owning downcast support.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Configurable> Component for T {
    fn component_type(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn export_properties(&self) -> ExportedProperties {
        let mut props = ExportedProperties::default();
        self.export(&mut props);
        props
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} component>", self.component_type())
    }
}

/// Shared handle to a live component.
pub type ComponentRef = Arc<dyn Component>;

/// Recovers the concrete type of a component handle.
#[must_use]
pub fn downcast<T: Configurable>(component: &ComponentRef) -> Option<Arc<T>> {
    Arc::clone(component).into_any().downcast::<T>().ok()
}

/// Coerced property values handed to [`Configurable::configure`].
///
/// The instance name and the registry handle only reach types whose schema
/// declares a name sink or a manager sink. The name arrives as a `String`
/// value under the name-sink field.
pub struct ConfiguredProperties<'a> {
    name: &'a str,
    manager: &'a ConfigurationManager,
    manager_sink: Option<&'a str>,
    values: IndexMap<String, TypedValue>,
}

impl<'a> ConfiguredProperties<'a> {
    /// Wraps coerced values for the instance `name`. No sink is declared.
    #[must_use]
    pub fn new(
        name: &'a str,
        manager: &'a ConfigurationManager,
        values: IndexMap<String, TypedValue>,
    ) -> Self {
        Self {
            name,
            manager,
            manager_sink: None,
            values,
        }
    }

    /// Wraps coerced values and fills the sinks `schema` declares.
    #[must_use]
    pub fn for_schema(
        name: &'a str,
        manager: &'a ConfigurationManager,
        schema: &'a ComponentSchema,
        mut values: IndexMap<String, TypedValue>,
    ) -> Self {
        if let Some(field) = schema.name_sink() {
            values.insert(field.to_string(), TypedValue::String(name.to_string()));
        }
        Self {
            name,
            manager,
            manager_sink: schema.manager_sink(),
            values,
        }
    }

    pub(crate) fn instance_name(&self) -> &str {
        self.name
    }

    /// A non-owning handle to the building registry, delivered to the
    /// declared manager-sink `field`. `None` for any other field.
    #[must_use]
    pub fn manager_sink(&self, field: &str) -> Option<WeakManager> {
        (self.manager_sink == Some(field)).then(|| self.manager.downgrade())
    }

    /// Whether a value was configured for `property`.
    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    /// Removes and returns the raw typed value for `property`.
    pub fn take_value(&mut self, property: &str) -> Option<TypedValue> {
        self.values.shift_remove(property)
    }

    /// Takes the value for `property`, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value cannot become a `T`.
    pub fn take<T: FromTypedValue>(&mut self, property: &str) -> Result<Option<T>> {
        match self.values.shift_remove(property) {
            None => Ok(None),
            Some(value) => {
                let found = value.kind_name();
                T::from_typed(value)
                    .map(Some)
                    .ok_or_else(|| self.mismatch::<T>(property, found))
            }
        }
    }

    /// Takes the value for `property`, or `default` if not configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value cannot become a `T`.
    pub fn take_or<T: FromTypedValue>(&mut self, property: &str, default: T) -> Result<T> {
        Ok(self.take(property)?.unwrap_or(default))
    }

    /// Takes the value for `property`, which must be configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMandatoryProperty`] if absent and
    /// [`Error::TypeMismatch`] if the value cannot become a `T`.
    pub fn require<T: FromTypedValue>(&mut self, property: &str) -> Result<T> {
        self.take(property)?
            .ok_or_else(|| Error::MissingMandatoryProperty {
                component: self.name.to_string(),
                property: property.to_string(),
            })
    }

    /// Takes a component reference as its concrete type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the referenced component is not a `T`.
    pub fn component<T: Configurable>(&mut self, property: &str) -> Result<Option<Arc<T>>> {
        match self.take::<ComponentRef>(property)? {
            None => Ok(None),
            Some(component) => self.downcast_one(property, &component).map(Some),
        }
    }

    /// Takes a component reference that must be configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMandatoryProperty`] if absent and
    /// [`Error::TypeMismatch`] if the referenced component is not a `T`.
    pub fn require_component<T: Configurable>(&mut self, property: &str) -> Result<Arc<T>> {
        self.component(property)?
            .ok_or_else(|| Error::MissingMandatoryProperty {
                component: self.name.to_string(),
                property: property.to_string(),
            })
    }

    /// Takes a collection of component references as their concrete type.
    ///
    /// Returns an empty list if the property was not configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if any element is not a `T`.
    pub fn components<T: Configurable>(&mut self, property: &str) -> Result<Vec<Arc<T>>> {
        let Some(components) = self.take::<Vec<ComponentRef>>(property)? else {
            return Ok(Vec::new());
        };
        components
            .iter()
            .map(|c| self.downcast_one(property, c))
            .collect()
    }

    /// Takes an enum value as its typed enum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value belongs to another enum.
    pub fn enumeration<E: ConfigEnum>(&mut self, property: &str) -> Result<Option<E>> {
        match self.take::<EnumValue>(property)? {
            None => Ok(None),
            Some(value) => value
                .to_enum::<E>()
                .map(Some)
                .ok_or_else(|| self.mismatch::<E>(property, value.enum_name)),
        }
    }

    /// Takes an enum set as typed enum values in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the set belongs to another enum.
    pub fn enum_set<E: ConfigEnum>(&mut self, property: &str) -> Result<Vec<E>> {
        let Some(set) = self.take::<std::collections::BTreeSet<EnumValue>>(property)? else {
            return Ok(Vec::new());
        };
        let mut values: Vec<E> = Vec::with_capacity(set.len());
        for value in &set {
            let typed = value
                .to_enum::<E>()
                .ok_or_else(|| self.mismatch::<E>(property, value.enum_name))?;
            values.push(typed);
        }
        values.sort_by_key(|v| E::VARIANTS.iter().position(|name| *name == v.variant()));
        Ok(values)
    }

    fn downcast_one<T: Configurable>(&self, property: &str, component: &ComponentRef) -> Result<Arc<T>> {
        downcast::<T>(component)
            .ok_or_else(|| self.mismatch::<T>(property, component.component_type()))
    }

    fn mismatch<T>(&self, property: &str, found: &str) -> Error {
        Error::TypeMismatch {
            component: self.name.to_string(),
            property: property.to_string(),
            details: format!("expected {}, found {found}", std::any::type_name::<T>()),
        }
    }
}

/// Property values reported by [`Configurable::export`].
#[derive(Debug, Clone, Default)]
pub struct ExportedProperties {
    values: IndexMap<String, TypedValue>,
}

impl ExportedProperties {
    /// Records the value of `property`.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<TypedValue>) -> &mut Self {
        self.values.insert(property.into(), value.into());
        self
    }

    /// Records the value of `property` if there is one.
    pub fn set_opt<V: Into<TypedValue>>(
        &mut self,
        property: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.set(property, value);
        }
        self
    }

    /// Records a typed value as is.
    pub fn set_value(&mut self, property: impl Into<String>, value: TypedValue) -> &mut Self {
        self.values.insert(property.into(), value);
        self
    }

    /// The value recorded for `property`.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&TypedValue> {
        self.values.get(property)
    }

    /// Recorded values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of recorded values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PropertyDescriptor, ScalarKind};

    #[derive(Debug, PartialEq)]
    struct Counter {
        start: i64,
        label: String,
    }

    impl Configurable for Counter {
        const TYPE_NAME: &'static str = "Counter";

        fn schema() -> ComponentSchema {
            ComponentSchema::builder(Self::TYPE_NAME)
                .property(PropertyDescriptor::new("start", ScalarKind::Long))
                .property(PropertyDescriptor::new("label", ScalarKind::String))
                .build()
        }

        fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self> {
            Ok(Self {
                start: props.take_or("start", 0)?,
                label: props.take_or("label", "counter".to_string())?,
            })
        }

        fn export(&self, props: &mut ExportedProperties) {
            props.set("start", self.start).set("label", self.label.as_str());
        }
    }

    #[test]
    fn test_configure_with_defaults() {
        let manager = ConfigurationManager::new();
        let mut props = ConfiguredProperties::new("c", &manager, IndexMap::new());
        let counter = Counter::configure(&mut props).unwrap();
        assert_eq!(counter, Counter { start: 0, label: "counter".to_string() });
    }

    #[test]
    fn test_take_reports_type_mismatch() {
        let manager = ConfigurationManager::new();
        let mut values = IndexMap::new();
        values.insert("start".to_string(), TypedValue::String("x".to_string()));
        let mut props = ConfiguredProperties::new("c", &manager, values);
        let err = Counter::configure(&mut props).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref property, .. } if property == "start"));
    }

    #[test]
    fn test_require_reports_missing() {
        let manager = ConfigurationManager::new();
        let mut props = ConfiguredProperties::new("c", &manager, IndexMap::new());
        let err = props.require::<String>("label").unwrap_err();
        assert!(matches!(err, Error::MissingMandatoryProperty { .. }));
    }

    #[test]
    fn test_declared_sinks_receive_name_and_registry() {
        let manager = ConfigurationManager::new();
        let schema = ComponentSchema::builder("Owned")
            .name_sink("owner")
            .manager_sink("registry")
            .build();
        let mut props = ConfiguredProperties::for_schema("o1", &manager, &schema, IndexMap::new());

        assert_eq!(props.require::<String>("owner").unwrap(), "o1");
        assert!(props.manager_sink("registry").and_then(|w| w.upgrade()).is_some());
        assert!(props.manager_sink("owner").is_none());
    }

    #[test]
    fn test_undeclared_sinks_receive_nothing() {
        let manager = ConfigurationManager::new();
        let schema = ComponentSchema::builder("Plain").build();
        let props = ConfiguredProperties::for_schema("p1", &manager, &schema, IndexMap::new());

        assert!(!props.contains("name"));
        assert!(props.manager_sink("manager").is_none());
    }

    #[test]
    fn test_component_downcast() {
        let counter: ComponentRef = Arc::new(Counter {
            start: 3,
            label: "x".to_string(),
        });
        assert_eq!(counter.component_type(), "Counter");
        assert_eq!(downcast::<Counter>(&counter).unwrap().start, 3);
        assert_eq!(format!("{counter:?}"), "<Counter component>");
    }

    #[test]
    fn test_export_properties() {
        let counter = Counter {
            start: 9,
            label: "nine".to_string(),
        };
        let exported = counter.export_properties();
        assert_eq!(exported.len(), 2);
        assert_eq!(exported.get("start"), Some(&TypedValue::Long(9)));
        let names: Vec<_> = exported.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["start", "label"]);
    }
}
