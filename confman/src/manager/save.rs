//! Saving the registry through a write model.

use std::path::Path;

use indexmap::IndexMap;

use super::ConfigurationManager;
use crate::error::Result;
use crate::property::PropertyValue;
use crate::record::RawComponentRecord;
use crate::writer::{ComponentAttributes, WriteModel, YamlWriter};

/// Which records [`ConfigurationManager::save`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveScope {
    /// Components that were instantiated, added or imported.
    #[default]
    Configured,
    /// Every known component.
    All,
}

impl ConfigurationManager {
    /// Writes globals and the selected records to `writer`.
    ///
    /// Records keep registry order. Properties marked redacted in the
    /// schema are left out.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `writer`.
    pub fn save(&self, writer: &mut dyn WriteModel, scope: SaveScope) -> Result<()> {
        let (globals, records) = {
            let state = self.inner.state.read();
            let records: Vec<RawComponentRecord> = state
                .records
                .iter()
                .filter(|(name, _)| match scope {
                    SaveScope::All => true,
                    SaveScope::Configured => {
                        state.configured.contains(*name) || state.added.contains(*name)
                    }
                })
                .map(|(_, record)| record.read().clone())
                .collect();
            (state.globals.as_map().clone(), records)
        };

        writer.start_document()?;
        writer.write_global_properties(&globals)?;
        writer.start_components()?;
        for record in &records {
            let schema = self.type_entry(record.type_name()).map(|e| e.schema().clone());
            let properties: IndexMap<String, PropertyValue> = record
                .properties()
                .filter(|(name, _)| {
                    !schema
                        .as_ref()
                        .and_then(|s| s.property(name))
                        .is_some_and(|d| d.is_redacted())
                })
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();
            let attributes = ComponentAttributes {
                name: record.name().to_string(),
                type_name: record.type_name().to_string(),
                legacy: record.legacy().clone(),
            };
            writer.write_component(&attributes, &properties)?;
        }
        writer.end_components()?;
        writer.end_document()?;

        log::debug!("saved {} components ({scope:?})", records.len());
        Ok(())
    }

    /// Renders the selected records as a YAML document.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub fn save_to_string(&self, scope: SaveScope) -> Result<String> {
        let mut writer = YamlWriter::new();
        self.save(&mut writer, scope)?;
        writer.into_string()
    }

    /// Writes the selected records as a YAML document to `path`.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save); also fails if `path` cannot be written.
    pub fn save_to_path(&self, path: &Path, scope: SaveScope) -> Result<()> {
        let mut writer = YamlWriter::new();
        self.save(&mut writer, scope)?;
        writer.write_to(path)
    }
}
