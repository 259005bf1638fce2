//! Configuration sources.
//!
//! A [`ConfigLoader`] turns a list of source locations into raw records and
//! global properties. The registry never parses files itself; it only
//! absorbs a [`LoadedConfig`].
//!
//! # Examples
//!
//! ```
//! use confman::loader::{LocationResolver, YamlLoader};
//! use confman::{ConfigLoader, ConfigurationManager};
//!
//! let resolver = LocationResolver::new().with_resource(
//!     "base.yaml",
//!     "properties:\n  root: /data\ncomponents:\n  - name: a\n    type: T\n",
//! );
//! let loaded = YamlLoader::new(resolver).load(&["base.yaml".to_string()]).unwrap();
//!
//! assert_eq!(loaded.records.len(), 1);
//! assert_eq!(loaded.globals.get("root"), Some("/data"));
//! ```

pub mod location;
pub mod yaml;

pub use location::LocationResolver;
pub use yaml::YamlLoader;

use crate::error::Result;
use crate::globals::GlobalPropertyTable;
use crate::record::RawComponentRecord;

/// Records and globals produced by a loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    /// Component records in source order.
    pub records: Vec<RawComponentRecord>,
    /// Global properties.
    pub globals: GlobalPropertyTable,
}

impl LoadedConfig {
    /// Folds a later source into this one.
    ///
    /// Later globals win. A later record with an existing name replaces
    /// the earlier record in place.
    pub fn merge(&mut self, later: Self) {
        self.globals.merge_from(&later.globals);
        for record in later.records {
            self.insert_record(record);
        }
    }

    /// Adds a record, replacing any record with the same name in place.
    pub fn insert_record(&mut self, record: RawComponentRecord) {
        match self.records.iter_mut().find(|r| r.name() == record.name()) {
            Some(existing) => {
                log::debug!("record {} replaced by a later source", record.name());
                *existing = record;
            }
            None => self.records.push(record),
        }
    }
}

/// Reads configuration from source locations.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigLoader {
    /// Loads and merges `locations` in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigLoadError`](crate::Error::ConfigLoadError) if a
    /// location cannot be resolved, read or parsed.
    fn load(&self, locations: &[String]) -> Result<LoadedConfig>;
}
