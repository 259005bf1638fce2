//! Property sheets: a raw record bound to its schema, plus the live instance.
//!
//! A sheet is created by binding a record to a registered type. Binding
//! checks once that every raw property is declared by the schema. After
//! that the sheet builds instances on demand from the record's *current*
//! raw values; later edits to the record never touch an instance that
//! already exists.

use std::cell::RefCell;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::coerce::ValueCoercer;
use crate::component::{ComponentRef, ConfiguredProperties};
use crate::error::{Error, Result};
use crate::globals::GlobalPropertyTable;
use crate::manager::ConfigurationManager;
use crate::property::PropertyValue;
use crate::record::RawComponentRecord;
use crate::schema::{ComponentSchema, TypeEntry, ValueKind};

/// A raw record shared between the registry and its sheet.
pub(crate) type SharedRecord = Arc<RwLock<RawComponentRecord>>;

thread_local! {
    static BUILDING: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

/// Marks a component as under construction on this thread.
struct BuildGuard;

impl BuildGuard {
    fn enter(name: &str) -> Result<Self> {
        BUILDING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().position(|n| n == name) {
                let mut cycle = stack[pos..].to_vec();
                cycle.push(name.to_string());
                return Err(Error::CyclicComponentReference { cycle });
            }
            stack.push(name.to_string());
            Ok(Self)
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// One named component: raw record, schema and cached instance.
#[derive(Debug)]
pub struct PropertySheet {
    record: SharedRecord,
    entry: TypeEntry,
    instance: Mutex<Option<ComponentRef>>,
}

impl PropertySheet {
    /// Binds `record` to the registered type `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPropertyInConfig`] if the record sets a
    /// property the schema does not declare.
    pub(crate) fn bind(record: SharedRecord, entry: TypeEntry) -> Result<Self> {
        {
            let raw = record.read();
            let schema = entry.schema();
            let undeclared = raw
                .property_names()
                .find(|p| !schema.declares(p))
                .map(str::to_string);
            if let Some(property) = undeclared {
                return Err(Error::UnknownPropertyInConfig {
                    component: raw.name().to_string(),
                    type_name: schema.type_name().to_string(),
                    property,
                });
            }
        }
        Ok(Self {
            record,
            entry,
            instance: Mutex::new(None),
        })
    }

    /// Returns the cached instance, or builds one.
    ///
    /// With `reuse == false` a fresh instance is always built and replaces
    /// the cached one. Construction happens under the sheet's lock, so two
    /// concurrent callers never both build a shared instance.
    ///
    /// # Errors
    ///
    /// Returns coercion errors, [`Error::MissingMandatoryProperty`],
    /// [`Error::CyclicComponentReference`] if building this component
    /// requires itself, and [`Error::PostConfigFailure`].
    pub(crate) fn get_instance(
        &self,
        manager: &ConfigurationManager,
        globals: &GlobalPropertyTable,
        reuse: bool,
    ) -> Result<ComponentRef> {
        let record = self.record.read().clone();
        let name = record.name();
        let _guard = BuildGuard::enter(name)?;

        let mut slot = self.instance.lock();
        if reuse {
            if let Some(instance) = slot.as_ref() {
                return Ok(Arc::clone(instance));
            }
        }

        let coercer = ValueCoercer::new(manager, globals, name);
        let mut values = IndexMap::new();
        for desc in self.entry.schema().properties() {
            let raw = record.get(desc.name()).or_else(|| desc.default());
            let value = match raw {
                Some(raw) => coercer.coerce(desc.name(), desc.kind(), raw)?,
                None => None,
            };
            match value {
                Some(value) => {
                    values.insert(desc.name().to_string(), value);
                }
                None if desc.is_mandatory() => {
                    return Err(Error::MissingMandatoryProperty {
                        component: name.to_string(),
                        property: desc.name().to_string(),
                    });
                }
                None => {}
            }
        }

        let mut props = ConfiguredProperties::for_schema(name, manager, self.entry.schema(), values);
        let instance = (self.entry.factory())(&mut props)?;
        log::debug!("instantiated component {name} ({})", self.type_name());

        *slot = Some(Arc::clone(&instance));
        Ok(instance)
    }

    /// Installs an existing instance as the cached one.
    pub(crate) fn set_instance(&self, instance: ComponentRef) {
        *self.instance.lock() = Some(instance);
    }

    /// The cached instance, if built.
    #[must_use]
    pub fn instance(&self) -> Option<ComponentRef> {
        self.instance.lock().clone()
    }

    /// Whether an instance is cached.
    #[must_use]
    pub fn is_instantiated(&self) -> bool {
        self.instance.lock().is_some()
    }

    /// The component name.
    #[must_use]
    pub fn name(&self) -> String {
        self.record.read().name().to_string()
    }

    /// The bound type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.entry.schema().type_name()
    }

    /// The bound schema.
    #[must_use]
    pub fn schema(&self) -> &ComponentSchema {
        self.entry.schema()
    }

    /// A snapshot of the raw record.
    #[must_use]
    pub fn record(&self) -> RawComponentRecord {
        self.record.read().clone()
    }

    /// The raw value of `property`, without substitution.
    #[must_use]
    pub fn raw(&self, property: &str) -> Option<PropertyValue> {
        self.record.read().get(property).cloned()
    }

    /// Names of the properties the record sets.
    #[must_use]
    pub fn raw_names(&self) -> Vec<String> {
        self.record.read().property_names().map(str::to_string).collect()
    }

    /// The substituted value of a scalar property, falling back to the
    /// schema default.
    ///
    /// # Errors
    ///
    /// Returns substitution errors, or [`Error::TypeMismatch`] if the
    /// property is declared as a collection.
    pub fn resolved_string(&self, globals: &GlobalPropertyTable, property: &str) -> Result<Option<String>> {
        let record = self.record.read();
        let raw = record
            .get(property)
            .or_else(|| self.schema().property(property).and_then(|d| d.default()));
        match raw {
            None => Ok(None),
            Some(PropertyValue::Scalar(text)) => globals.resolve(record.name(), property, text).map(Some),
            Some(other) => Err(Error::TypeMismatch {
                component: record.name().to_string(),
                property: property.to_string(),
                details: format!("expected a scalar, found a {}", other.shape()),
            }),
        }
    }

    /// The declared kind of `property`.
    #[must_use]
    pub fn kind_of(&self, property: &str) -> Option<&ValueKind> {
        self.schema().property(property).map(|d| d.kind())
    }
}
