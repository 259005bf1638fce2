//! Registry of configurable types.
//!
//! Each registered type contributes its validated schema, a set of
//! capability names it is assignable to, and a factory that builds
//! instances from coerced properties.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{ComponentSchema, ANY_COMPONENT};
use crate::component::{ComponentRef, Configurable, ConfiguredProperties};
use crate::error::{Error, Result};

/// Builds a type-erased instance from coerced properties.
pub(crate) type Factory = for<'a> fn(&mut ConfiguredProperties<'a>) -> Result<ComponentRef>;

fn build<T: Configurable>(props: &mut ConfiguredProperties<'_>) -> Result<ComponentRef> {
    let mut instance = T::configure(props)?;
    instance
        .post_configure()
        .map_err(|source| Error::PostConfigFailure {
            component: props.instance_name().to_string(),
            source,
        })?;
    Ok(Arc::new(instance))
}

/// A registered type.
#[derive(Clone)]
pub struct TypeEntry {
    schema: Arc<ComponentSchema>,
    capabilities: BTreeSet<String>,
    factory: Factory,
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("schema", &self.schema)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl TypeEntry {
    /// The validated schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<ComponentSchema> {
        &self.schema
    }

    /// Capability names this type is assignable to, besides its own name.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(String::as_str)
    }

    /// Whether instances can be used where `required` is expected.
    #[must_use]
    pub fn is_assignable_to(&self, required: &str) -> bool {
        required == ANY_COMPONENT
            || required == self.schema.type_name()
            || self.capabilities.contains(required)
    }

    pub(crate) fn factory(&self) -> Factory {
        self.factory
    }
}

/// All types a registry can instantiate, in registration order.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` with no extra capabilities.
    ///
    /// # Errors
    ///
    /// See [`TypeRegistry::register_as`].
    pub fn register<T: Configurable>(&mut self) -> Result<()> {
        self.register_as::<T>(&[])
    }

    /// Registers `T`, assignable to each name in `capabilities`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if the schema is invalid, names a
    /// type other than `T::TYPE_NAME`, or the type is already registered.
    pub fn register_as<T: Configurable>(&mut self, capabilities: &[&str]) -> Result<()> {
        let schema = T::schema();
        schema.validate()?;

        if schema.type_name() != T::TYPE_NAME {
            return Err(Error::InvalidSchema {
                type_name: T::TYPE_NAME.to_string(),
                reason: format!("schema describes type '{}'", schema.type_name()),
            });
        }
        if self.types.contains_key(T::TYPE_NAME) {
            return Err(Error::InvalidSchema {
                type_name: T::TYPE_NAME.to_string(),
                reason: "type is already registered".to_string(),
            });
        }

        log::debug!("registered type {} ({} properties)", T::TYPE_NAME, schema.properties().count());
        self.types.insert(
            T::TYPE_NAME.to_string(),
            TypeEntry {
                schema: Arc::new(schema),
                capabilities: capabilities.iter().map(|c| (*c).to_string()).collect(),
                factory: build::<T>,
            },
        );
        Ok(())
    }

    /// Looks up a registered type.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&TypeEntry> {
        self.types.get(type_name)
    }

    /// Whether `type_name` is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered type names in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Whether `type_name` can be used where `required` is expected.
    ///
    /// Unregistered types are only assignable to themselves and to
    /// [`ANY_COMPONENT`].
    #[must_use]
    pub fn is_assignable(&self, type_name: &str, required: &str) -> bool {
        if required == ANY_COMPONENT || required == type_name {
            return true;
        }
        self.types
            .get(type_name)
            .is_some_and(|entry| entry.is_assignable_to(required))
    }
}
