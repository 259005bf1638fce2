//! The YAML document shape shared by the loader and the writer.
//!
//! ```yaml
//! properties:
//!   root: /data
//! components:
//!   - name: frontend
//!     type: Frontend
//!     properties:
//!       sampleRate: "16000"
//!       stages: [mic, { type: Filter }]
//!       labels: { en: English }
//! ```
//!
//! Every scalar is kept as a string; numbers and booleans in the source are
//! stringified. A sequence item of the form `{type: T}` is a type reference.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::property::{ListItem, PropertyValue};

/// Key of the single-entry mapping that marks a type reference.
pub const TYPE_REFERENCE_KEY: &str = "type";

/// A whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    /// Global properties.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,

    /// Component records in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentEntry>,
}

/// One component record of a document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentEntry {
    /// The component name.
    pub name: String,

    /// The component type.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Raw property values.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,

    /// Location of a serialized instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_form: Option<String>,

    /// Exportable flag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub exportable: bool,

    /// Importable flag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub importable: bool,

    /// Leasable flag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub leasable: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Stringifies a YAML scalar. `null` becomes the empty string.
///
/// # Errors
///
/// Returns a description of the value if it is not a scalar.
pub fn scalar_to_string(value: &Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Sequence(_) => Err("expected a scalar, found a sequence".to_string()),
        Value::Mapping(_) => Err("expected a scalar, found a mapping".to_string()),
        Value::Tagged(tagged) => Err(format!("unsupported tag {}", tagged.tag)),
    }
}

/// Converts a YAML value to a raw property value.
///
/// # Errors
///
/// Returns a description of the problem for nested collections, tagged
/// values and malformed type references.
pub fn value_to_property(value: &Value) -> Result<PropertyValue, String> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Value::Mapping(map) => type_reference(map),
                other => scalar_to_string(other).map(ListItem::Value),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::List),
        Value::Mapping(map) => map
            .iter()
            .map(|(k, v)| Ok((scalar_to_string(k)?, scalar_to_string(v)?)))
            .collect::<Result<IndexMap<_, _>, String>>()
            .map(PropertyValue::Map),
        other => scalar_to_string(other).map(PropertyValue::Scalar),
    }
}

fn type_reference(map: &Mapping) -> Result<ListItem, String> {
    match (map.len(), map.get(TYPE_REFERENCE_KEY)) {
        (1, Some(Value::String(type_name))) => Ok(ListItem::TypeRef(type_name.clone())),
        _ => Err(format!(
            "list items must be scalars or '{{{TYPE_REFERENCE_KEY}: <type>}}' references"
        )),
    }
}

/// Converts a raw property value to YAML.
#[must_use]
pub fn property_to_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Scalar(s) => Value::String(s.clone()),
        PropertyValue::List(items) => Value::Sequence(
            items
                .iter()
                .map(|item| match item {
                    ListItem::Value(s) => Value::String(s.clone()),
                    ListItem::TypeRef(t) => {
                        let mut map = Mapping::new();
                        map.insert(
                            Value::String(TYPE_REFERENCE_KEY.to_string()),
                            Value::String(t.clone()),
                        );
                        Value::Mapping(map)
                    }
                })
                .collect(),
        ),
        PropertyValue::Map(entries) => Value::Mapping(
            entries
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), Value::String(v.clone())))
                .collect(),
        ),
    }
}
