//! The component registry.
//!
//! A [`ConfigurationManager`] owns the raw records, the global property
//! table and the registered types. Components are instantiated lazily on
//! [`lookup`](ConfigurationManager::lookup), at most once per name unless a
//! fresh instance is requested.
//!
//! Overrides always edit the raw record. An instance that was already
//! built keeps the values it was built from; look it up again with
//! `reuse == false` to see the override.
//!
//! # Examples
//!
//! ```
//! use confman::{
//!     ComponentSchema, Configurable, ConfigurationManager, ConfiguredProperties,
//!     ExportedProperties, PropertyDescriptor, RawComponentRecord, Result, ScalarKind,
//! };
//!
//! #[derive(Debug)]
//! struct Port {
//!     number: i32,
//! }
//!
//! impl Configurable for Port {
//!     const TYPE_NAME: &'static str = "Port";
//!
//!     fn schema() -> ComponentSchema {
//!         ComponentSchema::builder(Self::TYPE_NAME)
//!             .property(PropertyDescriptor::new("number", ScalarKind::Int).mandatory())
//!             .build()
//!     }
//!
//!     fn configure(props: &mut ConfiguredProperties<'_>) -> Result<Self> {
//!         Ok(Self { number: props.require("number")? })
//!     }
//!
//!     fn export(&self, props: &mut ExportedProperties) {
//!         props.set("number", self.number);
//!     }
//! }
//!
//! let manager = ConfigurationManager::new();
//! manager.register::<Port>().unwrap();
//! manager.set_global_property("base", "8000");
//! manager
//!     .add_component(RawComponentRecord::new("http", "Port").with_property("number", "${base}"))
//!     .unwrap();
//!
//! let port = manager.get::<Port>("http").unwrap();
//! assert_eq!(port.number, 8000);
//!
//! manager.override_property("http", "number", "9000").unwrap();
//! assert_eq!(manager.get::<Port>("http").unwrap().number, 8000);
//! ```

mod import;
mod save;

pub use save::SaveScope;

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

use crate::component::{downcast, ComponentRef, Configurable};
use crate::error::{Error, Result};
use crate::globals::{DistinguishedProperty, GlobalPropertyTable};
use crate::loader::{ConfigLoader, LoadedConfig};
use crate::options::Tokenizer;
use crate::property::{ListItem, PropertyValue};
use crate::record::RawComponentRecord;
use crate::schema::{TypeEntry, TypeRegistry, ValueKind};
use crate::sheet::{PropertySheet, SharedRecord};

/// Shared registry state.
#[derive(Debug, Default)]
struct State {
    records: IndexMap<String, SharedRecord>,
    sheets: HashMap<String, Arc<PropertySheet>>,
    globals: Arc<GlobalPropertyTable>,
    /// Names whose instance has been built.
    configured: IndexSet<String>,
    /// Names added programmatically or by import.
    added: IndexSet<String>,
    /// Imported instances, for identity reuse.
    imported: Vec<(String, ComponentRef)>,
}

#[derive(Debug, Default)]
struct Inner {
    types: RwLock<TypeRegistry>,
    state: RwLock<State>,
}

/// The component registry.
///
/// Cloning the manager clones a handle to the same registry; use
/// [`clone_detached`](Self::clone_detached) for an independent copy.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    inner: Arc<Inner>,
}

/// A non-owning handle to a registry.
#[derive(Debug, Clone)]
pub struct WeakManager(Weak<Inner>);

impl WeakManager {
    /// The registry, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ConfigurationManager> {
        self.0.upgrade().map(|inner| ConfigurationManager { inner })
    }
}

impl ConfigurationManager {
    /// An empty registry with no registered types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry instantiating the given types.
    #[must_use]
    pub fn with_types(types: TypeRegistry) -> Self {
        let manager = Self::new();
        *manager.inner.types.write() = types;
        manager
    }

    /// A non-owning handle to this registry.
    #[must_use]
    pub fn downgrade(&self) -> WeakManager {
        WeakManager(Arc::downgrade(&self.inner))
    }

    /// Registers a configurable type.
    ///
    /// # Errors
    ///
    /// See [`TypeRegistry::register_as`].
    pub fn register<T: Configurable>(&self) -> Result<()> {
        self.inner.types.write().register::<T>()
    }

    /// Registers a configurable type with capability names.
    ///
    /// # Errors
    ///
    /// See [`TypeRegistry::register_as`].
    pub fn register_as<T: Configurable>(&self, capabilities: &[&str]) -> Result<()> {
        self.inner.types.write().register_as::<T>(capabilities)
    }

    /// The registered entry for `type_name`.
    #[must_use]
    pub fn type_entry(&self, type_name: &str) -> Option<TypeEntry> {
        self.inner.types.read().get(type_name).cloned()
    }

    /// Whether components of `type_name` can be used where `required` is expected.
    #[must_use]
    pub fn is_assignable(&self, type_name: &str, required: &str) -> bool {
        self.inner.types.read().is_assignable(type_name, required)
    }

    /// Absorbs loaded records and globals.
    ///
    /// A loaded record replaces any record with the same name, dropping its
    /// instance. Loaded globals overwrite existing ones.
    pub fn absorb(&self, loaded: LoadedConfig) {
        let mut state = self.inner.state.write();
        Arc::make_mut(&mut state.globals).merge_from(&loaded.globals);
        for record in loaded.records {
            let name = record.name().to_string();
            state.sheets.remove(&name);
            state.configured.shift_remove(&name);
            state.imported.retain(|(n, _)| n != &name);
            state.records.insert(name, Arc::new(RwLock::new(record)));
        }
    }

    /// Loads `locations` through `loader` and absorbs the result.
    ///
    /// # Errors
    ///
    /// Returns the loader's error.
    pub fn load(&self, loader: &dyn ConfigLoader, locations: &[String]) -> Result<()> {
        let loaded = loader.load(locations)?;
        log::debug!(
            "loaded {} components and {} global properties from {}",
            loaded.records.len(),
            loaded.globals.len(),
            locations.join(", ")
        );
        self.absorb(loaded);
        Ok(())
    }

    /// Adds a record programmatically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateComponent`] if the name is taken.
    pub fn add_component(&self, record: RawComponentRecord) -> Result<()> {
        let mut state = self.inner.state.write();
        let name = record.name().to_string();
        if state.records.contains_key(&name) {
            return Err(Error::DuplicateComponent { name });
        }
        log::debug!("added component {name} ({})", record.type_name());
        state.added.insert(name.clone());
        state.records.insert(name, Arc::new(RwLock::new(record)));
        Ok(())
    }

    /// Whether a component named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.state.read().records.contains_key(name)
    }

    /// All component names in registration order.
    #[must_use]
    pub fn component_names(&self) -> Vec<String> {
        self.inner.state.read().records.keys().cloned().collect()
    }

    /// A snapshot of the raw record of `name`.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<RawComponentRecord> {
        self.inner.state.read().records.get(name).map(|r| r.read().clone())
    }

    /// Names of the raw properties set for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if there is no such component.
    pub fn property_names(&self, name: &str) -> Result<Vec<String>> {
        self.record(name)
            .map(|r| r.property_names().map(str::to_string).collect())
            .ok_or_else(|| Error::UnknownComponent { name: name.to_string() })
    }

    /// Whether `name` has a live instance.
    #[must_use]
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.inner
            .state
            .read()
            .sheets
            .get(name)
            .is_some_and(|s| s.is_instantiated())
    }

    /// Whether `name` has been instantiated through this registry.
    #[must_use]
    pub fn is_configured(&self, name: &str) -> bool {
        self.inner.state.read().configured.contains(name)
    }

    /// The property sheet of `name`, binding it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`], [`Error::UnknownType`] or
    /// [`Error::UnknownPropertyInConfig`].
    pub fn property_sheet(&self, name: &str) -> Result<Arc<PropertySheet>> {
        let (record, resolved) = {
            let state = self.inner.state.read();
            let resolved = Self::resolve_name(&state.globals, name)?;
            if let Some(sheet) = state.sheets.get(&resolved) {
                return Ok(Arc::clone(sheet));
            }
            let record = state
                .records
                .get(&resolved)
                .cloned()
                .ok_or_else(|| Error::UnknownComponent { name: resolved.clone() })?;
            (record, resolved)
        };

        let type_name = record.read().type_name().to_string();
        let entry = self.type_entry(&type_name).ok_or_else(|| Error::UnknownType {
            component: resolved.clone(),
            type_name,
        })?;
        let sheet = Arc::new(PropertySheet::bind(Arc::clone(&record), entry)?);

        let mut state = self.inner.state.write();
        match state.records.get(&resolved) {
            Some(current) if Arc::ptr_eq(current, &record) => {}
            _ => return Err(Error::UnknownComponent { name: resolved }),
        }
        Ok(Arc::clone(state.sheets.entry(resolved).or_insert(sheet)))
    }

    /// Returns the instance named `name`, building it if needed.
    ///
    /// `name` may itself be a `${global}` reference. With `reuse == true`
    /// the cached instance is returned when there is one; otherwise a
    /// fresh instance is built from the current raw values and cached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if there is no such component,
    /// and any binding, coercion or construction error.
    pub fn lookup(&self, name: &str, reuse: bool) -> Result<ComponentRef> {
        let sheet = self.property_sheet(name)?;
        let globals = self.globals_snapshot();
        let instance = sheet.get_instance(self, &globals, reuse)?;
        self.inner.state.write().configured.insert(sheet.name());
        Ok(instance)
    }

    /// Returns the shared instance of `name` as its concrete type.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`lookup`](Self::lookup), and
    /// [`Error::TypeMismatch`] if the component is not a `T`.
    pub fn get<T: Configurable>(&self, name: &str) -> Result<Arc<T>> {
        self.lookup_as::<T>(name, true)
    }

    /// Returns the instance of `name` as its concrete type.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn lookup_as<T: Configurable>(&self, name: &str, reuse: bool) -> Result<Arc<T>> {
        let component = self.lookup(name, reuse)?;
        downcast::<T>(&component).ok_or_else(|| Error::TypeMismatch {
            component: name.to_string(),
            property: String::new(),
            details: format!(
                "component of type '{}' is not a '{}'",
                component.component_type(),
                T::TYPE_NAME
            ),
        })
    }

    /// Names of the components assignable to `type_name`, in registration
    /// order. Importable records are skipped.
    #[must_use]
    pub fn list_all(&self, type_name: &str) -> Vec<String> {
        let candidates: Vec<(String, String)> = {
            let state = self.inner.state.read();
            state
                .records
                .iter()
                .filter_map(|(name, record)| {
                    let record = record.read();
                    (!record.legacy().importable)
                        .then(|| (name.clone(), record.type_name().to_string()))
                })
                .collect()
        };
        let types = self.inner.types.read();
        candidates
            .into_iter()
            .filter(|(_, ty)| types.is_assignable(ty, type_name))
            .map(|(name, _)| name)
            .collect()
    }

    /// Shared instances of every component assignable to `type_name`.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`lookup`](Self::lookup).
    pub fn lookup_all(&self, type_name: &str) -> Result<Vec<ComponentRef>> {
        self.list_all(type_name)
            .iter()
            .map(|name| self.lookup(name, true))
            .collect()
    }

    /// Sets a raw property of `name`.
    ///
    /// A live instance is not changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if there is no such component and
    /// [`Error::UnknownOverrideTarget`] if its registered type does not
    /// declare `property`.
    pub fn override_property(&self, name: &str, property: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let record = self
            .inner
            .state
            .read()
            .records
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownComponent { name: name.to_string() })?;

        let type_name = record.read().type_name().to_string();
        match self.type_entry(&type_name) {
            Some(entry) if !entry.schema().declares(property) => {
                return Err(Error::UnknownOverrideTarget {
                    target: format!("{name}.{property}"),
                });
            }
            Some(_) => {}
            None => log::warn!("overriding {name}.{property} of unregistered type {type_name}"),
        }

        let value = value.into();
        log::debug!("override {name}.{property} = {value}");
        record.write().set_property(property, value);
        Ok(())
    }

    /// Applies a `key = value` override given as text.
    ///
    /// The key is resolved in this order:
    /// 1. an existing global property: the global is set,
    /// 2. `component.property` with an existing component (split at the
    ///    last dot): the raw property is set. Values of list kinds are
    ///    split on commas, values of map kinds are `k=v` pairs,
    /// 3. a key without a dot: a new global property is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOverrideTarget`] if none of these apply, and
    /// [`Error::MalformedValue`] for a map entry without `=`.
    pub fn apply_override(&self, key: &str, value: &str) -> Result<()> {
        let is_global = {
            let state = self.inner.state.read();
            state.globals.is_explicit(key)
        } || DistinguishedProperty::from_name(key).is_some();
        if is_global {
            self.set_global_property(key, value);
            return Ok(());
        }

        if let Some((component, property)) = key.rsplit_once('.') {
            if self.contains(component) {
                let kind = self
                    .record(component)
                    .and_then(|r| self.type_entry(r.type_name()))
                    .and_then(|e| e.schema().property(property).map(|d| d.kind().clone()));
                let raw = Self::raw_from_text(&Tokenizer::default(), component, property, kind.as_ref(), value)?;
                return self.override_property(component, property, raw).map_err(|e| match e {
                    Error::UnknownComponent { .. } => Error::UnknownOverrideTarget {
                        target: key.to_string(),
                    },
                    other => other,
                });
            }
            return Err(Error::UnknownOverrideTarget {
                target: key.to_string(),
            });
        }

        self.set_global_property(key, value);
        Ok(())
    }

    /// Turns command-line text into a raw value shaped for `kind`.
    pub(crate) fn raw_from_text(
        tokenizer: &Tokenizer,
        component: &str,
        property: &str,
        kind: Option<&ValueKind>,
        value: &str,
    ) -> Result<PropertyValue> {
        match kind {
            Some(kind) if kind.is_sequence() => Ok(PropertyValue::List(
                tokenizer
                    .split(value)
                    .into_iter()
                    .map(ListItem::Value)
                    .collect(),
            )),
            Some(kind) if kind.is_map() => {
                let mut entries = IndexMap::new();
                for token in tokenizer.split(value) {
                    let (k, v) = token.split_once('=').ok_or_else(|| Error::MalformedValue {
                        component: component.to_string(),
                        property: property.to_string(),
                        kind: kind.to_string(),
                        value: token.clone(),
                    })?;
                    entries.insert(k.to_string(), v.to_string());
                }
                Ok(PropertyValue::Map(entries))
            }
            _ => Ok(PropertyValue::Scalar(value.to_string())),
        }
    }

    /// Sets a global property.
    pub fn set_global_property(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        log::debug!("global {name} = {value}");
        let mut state = self.inner.state.write();
        Arc::make_mut(&mut state.globals).set(name, value);
    }

    /// Removes an explicit global property.
    pub fn remove_global_property(&self, name: &str) -> Option<String> {
        let mut state = self.inner.state.write();
        Arc::make_mut(&mut state.globals).remove(name)
    }

    /// The value of a global property, including distinguished ones.
    #[must_use]
    pub fn global_property(&self, name: &str) -> Option<String> {
        self.inner.state.read().globals.get(name).map(str::to_string)
    }

    /// A copy of the global property table.
    #[must_use]
    pub fn global_properties(&self) -> GlobalPropertyTable {
        (*self.globals_snapshot()).clone()
    }

    /// Substitutes globals in `raw`. `owner` and `property` label errors.
    ///
    /// # Errors
    ///
    /// See [`GlobalPropertyTable::resolve`].
    pub fn substitute(&self, owner: &str, property: &str, raw: &str) -> Result<String> {
        self.globals_snapshot().resolve(owner, property, raw)
    }

    fn globals_snapshot(&self) -> Arc<GlobalPropertyTable> {
        Arc::clone(&self.inner.state.read().globals)
    }

    fn resolve_name(globals: &GlobalPropertyTable, name: &str) -> Result<String> {
        if name.contains("${") {
            globals.resolve(name, "name", name)
        } else {
            Ok(name.to_string())
        }
    }

    /// Renames a component and rewrites references to it.
    ///
    /// Every component-reference property of every other record whose raw
    /// value is exactly `old` is changed to `new`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if `old` does not exist and
    /// [`Error::DuplicateComponent`] if `new` does.
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        let types = self.inner.types.read().clone();
        let mut guard = self.inner.state.write();
        let state = &mut *guard;
        if state.records.contains_key(new) {
            return Err(Error::DuplicateComponent { name: new.to_string() });
        }
        let (index, _, record) = state
            .records
            .shift_remove_full(old)
            .ok_or_else(|| Error::UnknownComponent { name: old.to_string() })?;
        record.write().set_name(new);
        state.records.shift_insert(index, new.to_string(), record);

        if let Some(sheet) = state.sheets.remove(old) {
            state.sheets.insert(new.to_string(), sheet);
        }
        for set in [&mut state.configured, &mut state.added] {
            if let Some(i) = set.get_index_of(old) {
                set.shift_remove_index(i);
                set.shift_insert(i, new.to_string());
            }
        }
        for (name, _) in &mut state.imported {
            if name == old {
                *name = new.to_string();
            }
        }

        for (name, other) in &state.records {
            if name == new {
                continue;
            }
            let mut other = other.write();
            let Some(entry) = types.get(other.type_name()) else {
                continue;
            };
            let reference_props: Vec<String> = entry
                .schema()
                .properties()
                .filter(|d| d.kind().refers_to_components())
                .map(|d| d.name().to_string())
                .collect();
            for property in reference_props {
                let Some(value) = other.get(&property).cloned() else {
                    continue;
                };
                if let Some(renamed) = rename_reference(&value, old, new) {
                    log::debug!("{name}.{property}: reference {old} renamed to {new}");
                    other.set_property(property, renamed);
                }
            }
        }
        Ok(())
    }

    /// Removes a component.
    ///
    /// Later lookups of `name` fail with [`Error::UnknownComponent`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if there is no such component.
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut state = self.inner.state.write();
        if state.records.shift_remove(name).is_none() {
            return Err(Error::UnknownComponent { name: name.to_string() });
        }
        state.sheets.remove(name);
        state.configured.shift_remove(name);
        state.added.shift_remove(name);
        state.imported.retain(|(n, _)| n != name);
        log::debug!("removed component {name}");
        Ok(())
    }

    /// An independent copy of this registry.
    ///
    /// Records, globals and types are copied; no instance is carried over.
    #[must_use]
    pub fn clone_detached(&self) -> Self {
        let types = self.inner.types.read().clone();
        let state = self.inner.state.read();
        let copy = State {
            records: state
                .records
                .iter()
                .map(|(name, record)| (name.clone(), Arc::new(RwLock::new(record.read().clone()))))
                .collect(),
            sheets: HashMap::new(),
            globals: Arc::new((*state.globals).clone()),
            configured: IndexSet::new(),
            added: state.added.clone(),
            imported: Vec::new(),
        };
        Self {
            inner: Arc::new(Inner {
                types: RwLock::new(types),
                state: RwLock::new(copy),
            }),
        }
    }
}

fn rename_reference(value: &PropertyValue, old: &str, new: &str) -> Option<PropertyValue> {
    match value {
        PropertyValue::Scalar(s) if s == old => Some(PropertyValue::Scalar(new.to_string())),
        PropertyValue::Scalar(_) => None,
        PropertyValue::List(items) => {
            let hit = items.iter().any(|i| matches!(i, ListItem::Value(v) if v == old));
            hit.then(|| {
                PropertyValue::List(
                    items
                        .iter()
                        .map(|i| match i {
                            ListItem::Value(v) if v == old => ListItem::Value(new.to_string()),
                            other => other.clone(),
                        })
                        .collect(),
                )
            })
        }
        PropertyValue::Map(entries) => {
            let hit = entries.values().any(|v| v == old);
            hit.then(|| {
                PropertyValue::Map(
                    entries
                        .iter()
                        .map(|(k, v)| {
                            let v = if v == old { new.to_string() } else { v.clone() };
                            (k.clone(), v)
                        })
                        .collect(),
                )
            })
        }
    }
}
