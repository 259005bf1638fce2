//! YAML configuration loader.

use crate::document::{scalar_to_string, value_to_property, ConfigDocument};
use crate::error::{Error, Result};
use crate::globals::GlobalPropertyTable;
use crate::record::{LegacyFlags, RawComponentRecord};

use super::{ConfigLoader, LoadedConfig, LocationResolver};

/// Loads YAML documents found by a [`LocationResolver`].
#[derive(Debug, Clone, Default)]
pub struct YamlLoader {
    resolver: LocationResolver,
}

impl YamlLoader {
    /// A loader reading through `resolver`.
    #[must_use]
    pub fn new(resolver: LocationResolver) -> Self {
        Self { resolver }
    }

    /// A loader whose resource roots come from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LocationResolver::from_env())
    }

    /// Parses one document. `location` only labels errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigLoadError`] for invalid YAML, unknown keys or
    /// values that cannot be raw property values.
    pub fn parse_str(text: &str, location: &str) -> Result<LoadedConfig> {
        if text.trim().is_empty() {
            return Ok(LoadedConfig::default());
        }

        let doc: ConfigDocument = serde_yaml::from_str(text).map_err(|e| Error::ConfigLoadError {
            location: location.to_string(),
            reason: format!("Invalid YAML: {e}"),
        })?;
        let invalid = |what: String, reason: String| Error::ConfigLoadError {
            location: location.to_string(),
            reason: format!("{what}: {reason}"),
        };

        let mut globals = GlobalPropertyTable::new();
        for (name, value) in &doc.properties {
            let value = scalar_to_string(value)
                .map_err(|reason| invalid(format!("global property '{name}'"), reason))?;
            globals.set(name.clone(), value);
        }

        let mut loaded = LoadedConfig {
            records: Vec::with_capacity(doc.components.len()),
            globals,
        };
        for entry in doc.components {
            let mut record = RawComponentRecord::new(entry.name, entry.type_name).with_legacy(LegacyFlags {
                serialized_form: entry.serialized_form,
                exportable: entry.exportable,
                importable: entry.importable,
                leasable: entry.leasable,
            });
            for (property, value) in &entry.properties {
                let value = value_to_property(value).map_err(|reason| {
                    invalid(format!("property '{property}' of component '{}'", record.name()), reason)
                })?;
                record.set_property(property.clone(), value);
            }
            loaded.insert_record(record);
        }

        log::debug!(
            "parsed {location}: {} components, {} global properties",
            loaded.records.len(),
            loaded.globals.len()
        );
        Ok(loaded)
    }
}

impl ConfigLoader for YamlLoader {
    fn load(&self, locations: &[String]) -> Result<LoadedConfig> {
        let mut merged = LoadedConfig::default();
        for location in locations {
            let source = self.resolver.read(location)?;
            merged.merge(Self::parse_str(&source.contents, &source.origin)?);
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{ListItem, PropertyValue};
    use std::fs;
    use tempfile::TempDir;

    const BASE: &str = r"
properties:
  X: foo
  rate: 8000
components:
  - name: a
    type: StringTriple
    properties:
      one: ${X}
      two: plain
  - name: list
    type: Holder
    properties:
      items: [a, {type: StringTriple}]
";

    #[test]
    fn test_parse_records_and_globals() {
        let loaded = YamlLoader::parse_str(BASE, "base.yaml").unwrap();
        assert_eq!(loaded.globals.get("rate"), Some("8000"));
        assert_eq!(loaded.records.len(), 2);

        let a = &loaded.records[0];
        assert_eq!(a.get("one"), Some(&PropertyValue::from("${X}")));
        let items = loaded.records[1].get("items").and_then(PropertyValue::as_list).unwrap();
        assert_eq!(items[1], ListItem::TypeRef("StringTriple".to_string()));
    }

    #[test]
    fn test_parse_errors_name_location() {
        let err = YamlLoader::parse_str("components: [{name: a}]", "broken.yaml").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));

        let err = YamlLoader::parse_str(
            "components:\n  - name: a\n    type: T\n    properties:\n      p: [[1]]\n",
            "nested.yaml",
        )
        .unwrap_err();
        assert!(err.to_string().contains("property 'p' of component 'a'"));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(YamlLoader::parse_str("  \n", "empty.yaml").unwrap(), LoadedConfig::default());
    }

    #[test]
    fn test_load_merges_in_order() {
        let temp = TempDir::new().unwrap();
        let overlay = temp.path().join("overlay.yaml");
        fs::write(
            &overlay,
            "properties:\n  X: bar\ncomponents:\n  - name: a\n    type: StringTriple\n",
        )
        .unwrap();

        let loader = YamlLoader::new(LocationResolver::new().with_resource("base.yaml", BASE));
        let loaded = loader
            .load(&["base.yaml".to_string(), overlay.display().to_string()])
            .unwrap();

        assert_eq!(loaded.globals.get("X"), Some("bar"));
        assert_eq!(loaded.records[0].name(), "a");
        assert!(loaded.records[0].get("one").is_none());
        assert_eq!(loaded.records.len(), 2);
    }

    #[test]
    fn test_load_missing_location() {
        let loader = YamlLoader::default();
        let err = loader.load(&["nowhere.yaml".to_string()]).unwrap_err();
        assert!(err.is_config_io());
    }
}
