//! Importing live objects into the registry.
//!
//! Importing is the inverse of instantiation: the object's exported
//! property values are written back as raw values, nested components are
//! imported recursively under names derived from their parent, and the
//! object itself becomes the cached instance of the new record.
//!
//! Nested names are `parent.property` for a single reference,
//! `parent.property[i]` for the i-th element of a collection and
//! `parent.property[key]` for a map entry.
//!
//! Exported text containing `${` is rejected, since it would be read back
//! as a global property reference.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::ConfigurationManager;
use crate::component::{ComponentRef, Configurable};
use crate::error::{Error, Result};
use crate::property::{same_component, ListItem, PropertyValue, TypedValue};
use crate::record::RawComponentRecord;
use crate::sheet::PropertySheet;

impl ConfigurationManager {
    /// Imports `instance` under `name`, registering `T` if needed.
    ///
    /// Returns the name the instance is registered under, which is the
    /// earlier name if this very object was imported before.
    ///
    /// # Errors
    ///
    /// See [`import_component`](Self::import_component).
    pub fn import_instance<T: Configurable>(&self, instance: Arc<T>, name: &str) -> Result<String> {
        {
            let mut types = self.inner.types.write();
            if !types.contains(T::TYPE_NAME) {
                types.register::<T>()?;
            }
        }
        let erased: ComponentRef = instance;
        self.import_component(erased, name)
    }

    /// Imports a type-erased instance under `name`.
    ///
    /// Either the whole object tree is imported or nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateComponent`] if `name` (or a derived nested
    /// name) is taken by another component, and [`Error::UnknownType`] if
    /// the type of an object in the tree is not registered.
    pub fn import_component(&self, instance: ComponentRef, name: &str) -> Result<String> {
        let mut created = Vec::new();
        let result = self.import_tree(&instance, name, &mut created);
        if result.is_err() {
            for name in created.iter().rev() {
                self.forget(name);
            }
        }
        result
    }

    fn imported_name(&self, instance: &ComponentRef) -> Option<String> {
        self.inner
            .state
            .read()
            .imported
            .iter()
            .find(|(_, existing)| same_component(existing, instance))
            .map(|(name, _)| name.clone())
    }

    fn import_tree(&self, instance: &ComponentRef, name: &str, created: &mut Vec<String>) -> Result<String> {
        if let Some(existing) = self.imported_name(instance) {
            log::debug!("{name}: reusing imported component {existing}");
            return Ok(existing);
        }

        let type_name = instance.component_type();
        let entry = self.type_entry(type_name).ok_or_else(|| Error::UnknownType {
            component: name.to_string(),
            type_name: type_name.to_string(),
        })?;

        // Reserve the name first so nested references back to this object resolve.
        let shared = Arc::new(RwLock::new(RawComponentRecord::new(name, type_name)));
        {
            let mut state = self.inner.state.write();
            if state.records.contains_key(name) {
                return Err(Error::DuplicateComponent { name: name.to_string() });
            }
            state.records.insert(name.to_string(), Arc::clone(&shared));
            state.imported.push((name.to_string(), Arc::clone(instance)));
            state.added.insert(name.to_string());
        }
        created.push(name.to_string());

        let exported = instance.export_properties();
        let mut record = RawComponentRecord::new(name, type_name);
        for desc in entry.schema().properties() {
            if let Some(value) = exported.get(desc.name()) {
                let raw = self.raw_from_typed(name, desc.name(), value, created)?;
                record.set_property(desc.name(), raw);
            }
        }
        *shared.write() = record;

        let sheet = PropertySheet::bind(shared, entry)?;
        sheet.set_instance(Arc::clone(instance));
        {
            let mut state = self.inner.state.write();
            state.sheets.insert(name.to_string(), Arc::new(sheet));
            state.configured.insert(name.to_string());
        }
        log::debug!("imported component {name} ({type_name})");
        Ok(name.to_string())
    }

    fn raw_from_typed(
        &self,
        parent: &str,
        property: &str,
        value: &TypedValue,
        created: &mut Vec<String>,
    ) -> Result<PropertyValue> {
        let raw = match value {
            TypedValue::Component(component) => {
                PropertyValue::Scalar(self.import_tree(component, &format!("{parent}.{property}"), created)?)
            }
            TypedValue::Array(items) | TypedValue::List(items) | TypedValue::Set(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let text = match item {
                        TypedValue::Component(c) => {
                            self.import_tree(c, &format!("{parent}.{property}[{i}]"), created)?
                        }
                        other => Self::scalar_text(parent, property, other)?,
                    };
                    list.push(ListItem::Value(text));
                }
                PropertyValue::List(list)
            }
            TypedValue::EnumSet(set) => {
                PropertyValue::List(set.iter().map(|v| ListItem::Value(v.variant.to_string())).collect())
            }
            TypedValue::Map(entries) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    let text = match item {
                        TypedValue::Component(c) => {
                            self.import_tree(c, &format!("{parent}.{property}[{key}]"), created)?
                        }
                        other => Self::scalar_text(parent, property, other)?,
                    };
                    map.insert(key.clone(), text);
                }
                PropertyValue::Map(map)
            }
            other => PropertyValue::Scalar(Self::scalar_text(parent, property, other)?),
        };
        Ok(raw)
    }

    fn scalar_text(parent: &str, property: &str, value: &TypedValue) -> Result<String> {
        let text = value.to_raw_string().ok_or_else(|| Error::TypeMismatch {
            component: parent.to_string(),
            property: property.to_string(),
            details: format!("nested {} values cannot be imported", value.kind_name()),
        })?;
        // Raw values are substituted on instantiation, so a literal `${`
        // would not survive a round trip.
        if text.contains("${") {
            return Err(Error::TypeMismatch {
                component: parent.to_string(),
                property: property.to_string(),
                details: format!("value {text:?} contains a global property reference"),
            });
        }
        Ok(text)
    }

    fn forget(&self, name: &str) {
        let mut state = self.inner.state.write();
        state.records.shift_remove(name);
        state.sheets.remove(name);
        state.configured.shift_remove(name);
        state.added.shift_remove(name);
        state.imported.retain(|(n, _)| n != name);
    }
}
