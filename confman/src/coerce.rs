//! Type-directed coercion of raw values.
//!
//! [`ValueCoercer`] turns a raw [`PropertyValue`] into a [`TypedValue`]
//! according to the property's declared [`ValueKind`]. Every string passes
//! through global substitution first. Component references are resolved
//! through the registry, which may instantiate the referenced component.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime};
use indexmap::IndexMap;
use url::Url;

use crate::component::ComponentRef;
use crate::error::{Error, Result};
use crate::globals::GlobalPropertyTable;
use crate::manager::ConfigurationManager;
use crate::property::{EnumValue, ListItem, PropertyValue, SeededRandom, TypedValue};
use crate::schema::{EnumType, ScalarKind, ValueKind};

/// Parses one substituted string as a non-component scalar kind.
///
/// Leading and trailing whitespace is ignored except for `String` and
/// `Char`. `component` and `property` only label errors.
///
/// # Errors
///
/// Returns [`Error::MalformedValue`] if `raw` does not parse, and
/// [`Error::TypeMismatch`] for component kinds, which need a registry.
///
/// # Examples
///
/// ```
/// use confman::coerce::parse_scalar;
/// use confman::{ScalarKind, TypedValue};
///
/// let value = parse_scalar("decoder", "beamWidth", &ScalarKind::Int, "250").unwrap();
/// assert_eq!(value, TypedValue::Int(250));
/// assert!(parse_scalar("decoder", "beamWidth", &ScalarKind::Int, "wide").is_err());
/// ```
pub fn parse_scalar(component: &str, property: &str, kind: &ScalarKind, raw: &str) -> Result<TypedValue> {
    let malformed = || Error::MalformedValue {
        component: component.to_string(),
        property: property.to_string(),
        kind: kind.to_string(),
        value: raw.to_string(),
    };
    let text = raw.trim();

    let value = match kind {
        ScalarKind::String => TypedValue::String(raw.to_string()),
        ScalarKind::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => TypedValue::Char(c),
                _ => return Err(malformed()),
            }
        }
        ScalarKind::Bool => match text.to_ascii_lowercase().as_str() {
            "true" => TypedValue::Bool(true),
            "false" => TypedValue::Bool(false),
            _ => return Err(malformed()),
        },
        ScalarKind::Byte => TypedValue::Byte(text.parse().map_err(|_| malformed())?),
        ScalarKind::Short => TypedValue::Short(text.parse().map_err(|_| malformed())?),
        ScalarKind::Int => TypedValue::Int(text.parse().map_err(|_| malformed())?),
        ScalarKind::Long => TypedValue::Long(text.parse().map_err(|_| malformed())?),
        ScalarKind::Float => TypedValue::Float(text.parse().map_err(|_| malformed())?),
        ScalarKind::Double => TypedValue::Double(text.parse().map_err(|_| malformed())?),
        ScalarKind::AtomicInt => TypedValue::AtomicInt(text.parse().map_err(|_| malformed())?),
        ScalarKind::AtomicLong => TypedValue::AtomicLong(text.parse().map_err(|_| malformed())?),
        ScalarKind::Enum(enum_type) => {
            let variant = enum_type.variant(text).ok_or_else(malformed)?;
            TypedValue::Enum(EnumValue {
                enum_name: enum_type.name(),
                variant,
            })
        }
        ScalarKind::File => {
            if text.starts_with("file:") {
                let url = Url::parse(text).map_err(|_| malformed())?;
                TypedValue::File(url.to_file_path().map_err(|()| malformed())?)
            } else {
                TypedValue::File(PathBuf::from(text))
            }
        }
        ScalarKind::Path => TypedValue::Path(PathBuf::from(text)),
        ScalarKind::Url => TypedValue::Url(Url::parse(text).map_err(|_| malformed())?),
        ScalarKind::Random => {
            TypedValue::Random(SeededRandom::new(text.parse().map_err(|_| malformed())?))
        }
        ScalarKind::DateTime => {
            TypedValue::DateTime(DateTime::parse_from_rfc3339(text).map_err(|_| malformed())?)
        }
        ScalarKind::Date => TypedValue::Date(text.parse::<NaiveDate>().map_err(|_| malformed())?),
        ScalarKind::Time => TypedValue::Time(text.parse::<NaiveTime>().map_err(|_| malformed())?),
        ScalarKind::Component(required) => {
            return Err(Error::TypeMismatch {
                component: component.to_string(),
                property: property.to_string(),
                details: format!("reference to '{required}' cannot be resolved without a registry"),
            })
        }
    };
    Ok(value)
}

/// Coerces the raw values of one component.
pub struct ValueCoercer<'a> {
    manager: &'a ConfigurationManager,
    globals: &'a GlobalPropertyTable,
    component: &'a str,
}

impl<'a> ValueCoercer<'a> {
    /// A coercer for `component`, substituting from `globals` and
    /// resolving references through `manager`.
    #[must_use]
    pub fn new(
        manager: &'a ConfigurationManager,
        globals: &'a GlobalPropertyTable,
        component: &'a str,
    ) -> Self {
        Self {
            manager,
            globals,
            component,
        }
    }

    /// Coerces `raw` as `kind`.
    ///
    /// Returns `Ok(None)` when a scalar substitutes to the empty string for
    /// any kind but `String`; the caller treats that as "not set".
    ///
    /// # Errors
    ///
    /// Returns the substitution, parse, shape and lookup errors described
    /// on [`Error`].
    pub fn coerce(&self, property: &str, kind: &ValueKind, raw: &PropertyValue) -> Result<Option<TypedValue>> {
        match kind {
            ValueKind::Scalar(scalar) => self.coerce_scalar_value(property, scalar, raw),
            ValueKind::ArrayOf(elem) => Ok(self
                .coerce_sequence(property, elem, raw)?
                .map(TypedValue::Array)),
            ValueKind::ListOf(elem) => Ok(self
                .coerce_sequence(property, elem, raw)?
                .map(TypedValue::List)),
            ValueKind::SetOf(elem) => Ok(self.coerce_sequence(property, elem, raw)?.map(|items| {
                let mut unique: Vec<TypedValue> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                TypedValue::Set(unique)
            })),
            ValueKind::EnumSetOf(enum_type) => self
                .coerce_enum_set(property, *enum_type, raw)
                .map(|set| set.map(TypedValue::EnumSet)),
            ValueKind::MapOf(elem) => self.coerce_map(property, elem, raw).map(|m| m.map(TypedValue::Map)),
        }
    }

    /// Substitutes globals in one raw string of this component.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`GlobalPropertyTable::resolve`].
    pub fn substitute(&self, property: &str, raw: &str) -> Result<String> {
        self.globals.resolve(self.component, property, raw)
    }

    fn coerce_scalar_value(
        &self,
        property: &str,
        kind: &ScalarKind,
        raw: &PropertyValue,
    ) -> Result<Option<TypedValue>> {
        let PropertyValue::Scalar(text) = raw else {
            return Err(self.mismatch(property, format!("expected a scalar {kind}, found a {}", raw.shape())));
        };
        let resolved = self.substitute(property, text)?;
        if resolved.is_empty() && *kind != ScalarKind::String {
            return Ok(None);
        }
        self.coerce_element(property, kind, &resolved).map(Some)
    }

    fn coerce_element(&self, property: &str, kind: &ScalarKind, resolved: &str) -> Result<TypedValue> {
        match kind {
            ScalarKind::Component(required) => {
                let component = self.manager.lookup(resolved, true)?;
                self.check_assignable(property, required, &component)?;
                Ok(TypedValue::Component(component))
            }
            _ => parse_scalar(self.component, property, kind, resolved),
        }
    }

    fn coerce_sequence(
        &self,
        property: &str,
        elem: &ScalarKind,
        raw: &PropertyValue,
    ) -> Result<Option<Vec<TypedValue>>> {
        let items: Vec<ListItem> = match raw {
            PropertyValue::Scalar(text) => {
                if self.substitute(property, text)?.is_empty() {
                    return Ok(None);
                }
                vec![ListItem::Value(text.clone())]
            }
            PropertyValue::List(items) => items.clone(),
            PropertyValue::Map(_) => {
                return Err(self.mismatch(property, format!("expected a list of {elem}, found a map")))
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            match item {
                ListItem::Value(text) => {
                    let resolved = self.substitute(property, text)?;
                    out.push(self.coerce_element(property, elem, &resolved)?);
                }
                ListItem::TypeRef(type_name) => {
                    let ScalarKind::Component(required) = elem else {
                        return Err(self.mismatch(
                            property,
                            format!("type reference '{type_name}' in a list of {elem}"),
                        ));
                    };
                    let type_name = self.substitute(property, type_name)?;
                    for component in self.manager.lookup_all(&type_name)? {
                        self.check_assignable(property, required, &component)?;
                        out.push(TypedValue::Component(component));
                    }
                }
            }
        }
        Ok(Some(out))
    }

    fn coerce_enum_set(
        &self,
        property: &str,
        enum_type: EnumType,
        raw: &PropertyValue,
    ) -> Result<Option<BTreeSet<EnumValue>>> {
        let literals: Vec<&str> = match raw {
            PropertyValue::Scalar(text) => vec![text.as_str()],
            PropertyValue::List(items) => {
                let mut literals = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        ListItem::Value(text) => literals.push(text.as_str()),
                        ListItem::TypeRef(type_name) => {
                            return Err(self.mismatch(
                                property,
                                format!("type reference '{type_name}' in an enum set"),
                            ))
                        }
                    }
                }
                literals
            }
            PropertyValue::Map(_) => {
                return Err(self.mismatch(property, "expected an enum set, found a map".to_string()))
            }
        };

        let mut set = BTreeSet::new();
        for literal in literals {
            let resolved = self.substitute(property, literal)?;
            let upper = resolved.trim().to_uppercase();
            if upper.is_empty() {
                continue;
            }
            let variant = enum_type.variant(&upper).ok_or_else(|| Error::InvalidEnumValue {
                component: self.component.to_string(),
                property: property.to_string(),
                enum_name: enum_type.name().to_string(),
                value: resolved.clone(),
            })?;
            set.insert(EnumValue {
                enum_name: enum_type.name(),
                variant,
            });
        }
        Ok(Some(set))
    }

    fn coerce_map(
        &self,
        property: &str,
        elem: &ScalarKind,
        raw: &PropertyValue,
    ) -> Result<Option<IndexMap<String, TypedValue>>> {
        let PropertyValue::Map(entries) = raw else {
            return Err(self.mismatch(property, format!("expected a map of {elem}, found a {}", raw.shape())));
        };

        let mut out = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let resolved = self.substitute(property, value)?;
            out.insert(key.clone(), self.coerce_element(property, elem, &resolved)?);
        }
        Ok(Some(out))
    }

    fn check_assignable(&self, property: &str, required: &str, component: &ComponentRef) -> Result<()> {
        if self.manager.is_assignable(component.component_type(), required) {
            Ok(())
        } else {
            Err(self.mismatch(
                property,
                format!("component of type '{}' is not a '{required}'", component.component_type()),
            ))
        }
    }

    fn mismatch(&self, property: &str, details: String) -> Error {
        Error::TypeMismatch {
            component: self.component.to_string(),
            property: property.to_string(),
            details,
        }
    }
}
