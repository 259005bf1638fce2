//! Raw and typed property values.
//!
//! A [`PropertyValue`] is what a configuration source provides: strings and
//! type references, never numbers. A [`TypedValue`] is what coercion
//! produces once a value has been substituted and parsed against its
//! declared [`ValueKind`](crate::schema::ValueKind).

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use url::Url;

use crate::component::{Component, ComponentRef, Configurable};
use crate::schema::ConfigEnum;

/// Format used for `Date` values when written back to raw form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for `Time` values when written back to raw form.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// One element of a raw list value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListItem {
    /// A plain string (component name, number, path, ...).
    Value(String),
    /// A reference to every registered component assignable to a type.
    TypeRef(String),
}

impl ListItem {
    /// Returns the string payload, whichever variant this is.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Value(s) | Self::TypeRef(s) => s,
        }
    }
}

impl From<&str> for ListItem {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for ListItem {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

/// An unresolved configuration value.
///
/// # Examples
///
/// ```
/// use confman::{ListItem, PropertyValue};
///
/// let scalar = PropertyValue::from("${X}");
/// assert_eq!(scalar.as_scalar(), Some("${X}"));
///
/// let list = PropertyValue::list(["x", "y"]);
/// assert_eq!(list.as_list().unwrap().len(), 2);
///
/// let expanded = PropertyValue::List(vec![
///     ListItem::from("x"),
///     ListItem::TypeRef("Frontend".to_string()),
/// ]);
/// assert!(matches!(expanded.as_list().unwrap()[1], ListItem::TypeRef(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A single string.
    Scalar(String),
    /// An ordered list of strings and type references.
    List(Vec<ListItem>),
    /// A string-keyed map of strings.
    Map(IndexMap<String, String>),
}

impl PropertyValue {
    /// Builds a list value from plain strings.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| ListItem::Value(s.into())).collect())
    }

    /// Builds a map value from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the scalar string, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ListItem]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map entries, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the shape, used in diagnostics.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        ListItem::Value(s) => write!(f, "{s}")?,
                        ListItem::TypeRef(t) => write!(f, "<{t}>")?,
                    }
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A random number generator configured by its seed.
///
/// Two generators built from the same seed produce the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeededRandom {
    seed: u64,
}

impl SeededRandom {
    /// Creates a seeded generator description.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Returns the seed.
    #[must_use]
    pub const fn seed(self) -> u64 {
        self.seed
    }

    /// Builds a fresh generator positioned at the start of the sequence.
    #[must_use]
    pub fn rng(self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

/// A coerced enum value: the enum type name and the variant literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumValue {
    /// The enum type name.
    pub enum_name: &'static str,
    /// The variant literal as declared.
    pub variant: &'static str,
}

impl EnumValue {
    /// Captures a typed enum value.
    #[must_use]
    pub fn of<E: ConfigEnum>(value: E) -> Self {
        Self {
            enum_name: E::NAME,
            variant: value.variant(),
        }
    }

    /// Converts back to the typed enum.
    #[must_use]
    pub fn to_enum<E: ConfigEnum>(&self) -> Option<E> {
        if self.enum_name == E::NAME {
            E::from_variant(self.variant)
        } else {
            None
        }
    }
}

/// A value after substitution and coercion.
#[derive(Debug, Clone)]
pub enum TypedValue {
    /// `Bool`
    Bool(bool),
    /// `Byte`
    Byte(i8),
    /// `Char`
    Char(char),
    /// `Short`
    Short(i16),
    /// `Int`
    Int(i32),
    /// `Long`
    Long(i64),
    /// `Float`
    Float(f32),
    /// `Double`
    Double(f64),
    /// `String`
    String(String),
    /// A live component instance.
    Component(ComponentRef),
    /// An enum variant.
    Enum(EnumValue),
    /// Initial value of an atomic int.
    AtomicInt(i32),
    /// Initial value of an atomic long.
    AtomicLong(i64),
    /// A file location.
    File(PathBuf),
    /// A filesystem path.
    Path(PathBuf),
    /// A URL.
    Url(Url),
    /// A seeded random generator.
    Random(SeededRandom),
    /// A timestamp with offset (RFC 3339).
    DateTime(DateTime<FixedOffset>),
    /// A calendar date.
    Date(NaiveDate),
    /// A wall-clock time.
    Time(NaiveTime),
    /// Elements of an `ArrayOf` property.
    Array(Vec<TypedValue>),
    /// Elements of a `ListOf` property.
    List(Vec<TypedValue>),
    /// Elements of a `SetOf` property, first occurrence order, no duplicates.
    Set(Vec<TypedValue>),
    /// Variants of an `EnumSetOf` property.
    EnumSet(BTreeSet<EnumValue>),
    /// Entries of a `MapOf` property.
    Map(IndexMap<String, TypedValue>),
}

impl TypedValue {
    /// Wraps a typed enum value.
    #[must_use]
    pub fn enumeration<E: ConfigEnum>(value: E) -> Self {
        Self::Enum(EnumValue::of(value))
    }

    /// Wraps a set of typed enum values.
    pub fn enum_set<E: ConfigEnum>(values: impl IntoIterator<Item = E>) -> Self {
        Self::EnumSet(values.into_iter().map(EnumValue::of).collect())
    }

    /// Wraps an already type-erased component.
    #[must_use]
    pub fn component(value: ComponentRef) -> Self {
        Self::Component(value)
    }

    /// Returns the scalar value as it would be written in a config file.
    ///
    /// Collections and components have no scalar form and return `None`.
    #[must_use]
    pub fn to_raw_string(&self) -> Option<String> {
        let raw = match self {
            Self::Bool(v) => v.to_string(),
            Self::Byte(v) => v.to_string(),
            Self::Char(v) => v.to_string(),
            Self::Short(v) => v.to_string(),
            Self::Int(v) | Self::AtomicInt(v) => v.to_string(),
            Self::Long(v) | Self::AtomicLong(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::String(v) => v.clone(),
            Self::Enum(v) => v.variant.to_string(),
            Self::File(p) | Self::Path(p) => p.display().to_string(),
            Self::Url(u) => u.as_str().to_string(),
            Self::Random(r) => r.seed().to_string(),
            Self::DateTime(dt) => dt.to_rfc3339(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::Time(t) => t.format(TIME_FORMAT).to_string(),
            Self::Component(_)
            | Self::Array(_)
            | Self::List(_)
            | Self::Set(_)
            | Self::EnumSet(_)
            | Self::Map(_) => return None,
        };
        Some(raw)
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Char(_) => "char",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Component(_) => "component",
            Self::Enum(_) => "enum",
            Self::AtomicInt(_) => "atomic int",
            Self::AtomicLong(_) => "atomic long",
            Self::File(_) => "file",
            Self::Path(_) => "path",
            Self::Url(_) => "url",
            Self::Random(_) => "random",
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::EnumSet(_) => "enum set",
            Self::Map(_) => "map",
        }
    }
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) | (Self::AtomicInt(a), Self::AtomicInt(b)) => a == b,
            (Self::Long(a), Self::Long(b)) | (Self::AtomicLong(a), Self::AtomicLong(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Component(a), Self::Component(b)) => same_component(a, b),
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::File(a), Self::File(b)) | (Self::Path(a), Self::Path(b)) => a == b,
            (Self::Url(a), Self::Url(b)) => a == b,
            (Self::Random(a), Self::Random(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Array(a), Self::Array(b))
            | (Self::List(a), Self::List(b))
            | (Self::Set(a), Self::Set(b)) => a == b,
            (Self::EnumSet(a), Self::EnumSet(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Identity comparison of two component handles.
#[must_use]
pub fn same_component(a: &ComponentRef, b: &ComponentRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

macro_rules! typed_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TypedValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

typed_value_from! {
    bool => Bool,
    i8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    PathBuf => Path,
    Url => Url,
    SeededRandom => Random,
    DateTime<FixedOffset> => DateTime,
    NaiveDate => Date,
    NaiveTime => Time,
    ComponentRef => Component,
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<T: Configurable> From<Arc<T>> for TypedValue {
    fn from(value: Arc<T>) -> Self {
        let erased: Arc<dyn Component> = value;
        Self::Component(erased)
    }
}

impl<T: Into<TypedValue>> From<Vec<T>> for TypedValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<TypedValue>> From<IndexMap<String, T>> for TypedValue {
    fn from(values: IndexMap<String, T>) -> Self {
        Self::Map(values.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Extraction of a concrete Rust value from a [`TypedValue`].
///
/// Returns `None` when the value has a different shape; callers turn that
/// into a [`TypeMismatch`](crate::Error::TypeMismatch).
pub trait FromTypedValue: Sized {
    /// Converts the typed value, or gives up.
    fn from_typed(value: TypedValue) -> Option<Self>;
}

macro_rules! from_typed_scalar {
    ($($ty:ty => $($variant:ident)|+),* $(,)?) => {
        $(
            impl FromTypedValue for $ty {
                fn from_typed(value: TypedValue) -> Option<Self> {
                    match value {
                        $(TypedValue::$variant(v) => Some(v),)+
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_typed_scalar! {
    bool => Bool,
    i8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int | AtomicInt,
    i64 => Long | AtomicLong,
    f32 => Float,
    f64 => Double,
    String => String,
    PathBuf => Path | File,
    Url => Url,
    SeededRandom => Random,
    DateTime<FixedOffset> => DateTime,
    NaiveDate => Date,
    NaiveTime => Time,
    ComponentRef => Component,
    EnumValue => Enum,
}

impl FromTypedValue for std::sync::atomic::AtomicI32 {
    fn from_typed(value: TypedValue) -> Option<Self> {
        i32::from_typed(value).map(Self::new)
    }
}

impl FromTypedValue for std::sync::atomic::AtomicI64 {
    fn from_typed(value: TypedValue) -> Option<Self> {
        i64::from_typed(value).map(Self::new)
    }
}

impl<T: FromTypedValue> FromTypedValue for Vec<T> {
    fn from_typed(value: TypedValue) -> Option<Self> {
        match value {
            TypedValue::Array(items) | TypedValue::List(items) | TypedValue::Set(items) => {
                items.into_iter().map(T::from_typed).collect()
            }
            _ => None,
        }
    }
}

impl<T: FromTypedValue> FromTypedValue for IndexMap<String, T> {
    fn from_typed(value: TypedValue) -> Option<Self> {
        match value {
            TypedValue::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| T::from_typed(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}

impl FromTypedValue for BTreeSet<EnumValue> {
    fn from_typed(value: TypedValue) -> Option<Self> {
        match value {
            TypedValue::EnumSet(set) => Some(set),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_accessors() {
        let scalar = PropertyValue::from("abc");
        assert_eq!(scalar.as_scalar(), Some("abc"));
        assert!(scalar.as_list().is_none());
        assert_eq!(scalar.shape(), "scalar");

        let map = PropertyValue::map([("k", "v")]);
        assert_eq!(map.as_map().unwrap()["k"], "v");
        assert_eq!(map.shape(), "map");
    }

    #[test]
    fn test_property_value_display() {
        let list = PropertyValue::List(vec![
            ListItem::from("x"),
            ListItem::TypeRef("Frontend".to_string()),
        ]);
        assert_eq!(list.to_string(), "[x, <Frontend>]");
        assert_eq!(PropertyValue::map([("a", "1")]).to_string(), "{a: 1}");
    }

    #[test]
    fn test_to_raw_string_scalars() {
        assert_eq!(TypedValue::Bool(true).to_raw_string().unwrap(), "true");
        assert_eq!(TypedValue::Double(0.5).to_raw_string().unwrap(), "0.5");
        assert_eq!(TypedValue::Char('x').to_raw_string().unwrap(), "x");
        assert_eq!(
            TypedValue::Random(SeededRandom::new(42)).to_raw_string().unwrap(),
            "42"
        );
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(TypedValue::Date(date).to_raw_string().unwrap(), "2024-02-29");
        assert!(TypedValue::List(vec![]).to_raw_string().is_none());
    }

    #[test]
    fn test_seeded_random_is_deterministic() {
        use rand::Rng;

        let seeded = SeededRandom::new(7);
        let a: u64 = seeded.rng().gen();
        let b: u64 = seeded.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_typed_value() {
        assert_eq!(i32::from_typed(TypedValue::Int(3)), Some(3));
        assert_eq!(i32::from_typed(TypedValue::AtomicInt(4)), Some(4));
        assert_eq!(i32::from_typed(TypedValue::Long(3)), None);
        assert_eq!(
            Vec::<i32>::from_typed(TypedValue::Array(vec![TypedValue::Int(1), TypedValue::Int(2)])),
            Some(vec![1, 2])
        );
        assert_eq!(
            Vec::<i32>::from_typed(TypedValue::List(vec![TypedValue::String("x".into())])),
            None
        );
    }

    #[test]
    fn test_typed_value_equality() {
        assert_eq!(TypedValue::from("a"), TypedValue::String("a".to_string()));
        assert_ne!(TypedValue::Int(1), TypedValue::Long(1));
        assert_eq!(
            TypedValue::from(vec![1i32, 2]),
            TypedValue::List(vec![TypedValue::Int(1), TypedValue::Int(2)])
        );
    }
}
