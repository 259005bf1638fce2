//! Value kinds: the declared type of a schema property.

use std::fmt;

/// Required type of a component reference that accepts any component.
pub const ANY_COMPONENT: &str = "*";

/// An enum type usable in configuration.
///
/// Implemented by hand for each configurable enum; variant literals are the
/// exact strings accepted in configuration files.
///
/// # Examples
///
/// ```
/// use confman::ConfigEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Color {
///     Red,
///     Green,
/// }
///
/// impl ConfigEnum for Color {
///     const NAME: &'static str = "Color";
///     const VARIANTS: &'static [&'static str] = &["RED", "GREEN"];
///
///     fn from_variant(variant: &str) -> Option<Self> {
///         match variant {
///             "RED" => Some(Self::Red),
///             "GREEN" => Some(Self::Green),
///             _ => None,
///         }
///     }
///
///     fn variant(self) -> &'static str {
///         match self {
///             Self::Red => "RED",
///             Self::Green => "GREEN",
///         }
///     }
/// }
///
/// assert_eq!(Color::from_variant("GREEN"), Some(Color::Green));
/// ```
pub trait ConfigEnum: Sized + Copy + Send + Sync + 'static {
    /// The enum type name.
    const NAME: &'static str;
    /// Every variant literal, in declaration order.
    const VARIANTS: &'static [&'static str];

    /// Looks up a variant by its exact literal.
    fn from_variant(variant: &str) -> Option<Self>;

    /// The literal of this variant.
    fn variant(self) -> &'static str;
}

/// Runtime description of a [`ConfigEnum`].
#[derive(Debug, Clone, Copy)]
pub struct EnumType {
    name: &'static str,
    variants: &'static [&'static str],
}

impl EnumType {
    /// Describes the enum `E`.
    #[must_use]
    pub fn of<E: ConfigEnum>() -> Self {
        Self {
            name: E::NAME,
            variants: E::VARIANTS,
        }
    }

    /// The enum type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Every variant literal.
    #[must_use]
    pub const fn variants(&self) -> &'static [&'static str] {
        self.variants
    }

    /// Finds the static literal matching `literal` exactly.
    #[must_use]
    pub fn variant(&self, literal: &str) -> Option<&'static str> {
        self.variants.iter().copied().find(|v| *v == literal)
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EnumType {}

/// Kind of a single value, or of each element of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    /// `true` / `false`.
    Bool,
    /// 8-bit signed integer.
    Byte,
    /// A single character.
    Char,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Free text.
    String,
    /// Name of another component assignable to the given type.
    Component(String),
    /// A variant of the given enum.
    Enum(EnumType),
    /// Initial value of an atomic 32-bit integer.
    AtomicInt,
    /// Initial value of an atomic 64-bit integer.
    AtomicLong,
    /// A file location.
    File,
    /// A filesystem path.
    Path,
    /// An absolute URL.
    Url,
    /// Seed of a random number generator.
    Random,
    /// RFC 3339 timestamp.
    DateTime,
    /// `YYYY-MM-DD` date.
    Date,
    /// `HH:MM:SS[.fff]` time.
    Time,
}

impl ScalarKind {
    /// A reference to a component assignable to `type_name`.
    pub fn component(type_name: impl Into<String>) -> Self {
        Self::Component(type_name.into())
    }

    /// A reference to any component.
    #[must_use]
    pub fn any_component() -> Self {
        Self::Component(ANY_COMPONENT.to_string())
    }

    /// A variant of enum `E`.
    #[must_use]
    pub fn enumeration<E: ConfigEnum>() -> Self {
        Self::Enum(EnumType::of::<E>())
    }

    /// Whether values of this kind name other components.
    #[must_use]
    pub const fn is_component(&self) -> bool {
        matches!(self, Self::Component(_))
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Byte => write!(f, "byte"),
            Self::Char => write!(f, "char"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Component(t) => write!(f, "component<{t}>"),
            Self::Enum(e) => write!(f, "enum<{}>", e.name()),
            Self::AtomicInt => write!(f, "atomic int"),
            Self::AtomicLong => write!(f, "atomic long"),
            Self::File => write!(f, "file"),
            Self::Path => write!(f, "path"),
            Self::Url => write!(f, "url"),
            Self::Random => write!(f, "random seed"),
            Self::DateTime => write!(f, "datetime"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
        }
    }
}

/// Declared kind of a schema property.
///
/// Collections only ever hold [`ScalarKind`] elements, so nested
/// collections cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// A single value.
    Scalar(ScalarKind),
    /// A fixed array of values.
    ArrayOf(ScalarKind),
    /// An ordered list of values.
    ListOf(ScalarKind),
    /// A set of values, duplicates dropped.
    SetOf(ScalarKind),
    /// A set of enum variants, literals matched upper-cased.
    EnumSetOf(EnumType),
    /// A string-keyed map of values.
    MapOf(ScalarKind),
}

impl ValueKind {
    /// The element kind, for collections and scalars alike.
    #[must_use]
    pub fn element(&self) -> Option<&ScalarKind> {
        match self {
            Self::Scalar(k) | Self::ArrayOf(k) | Self::ListOf(k) | Self::SetOf(k) | Self::MapOf(k) => {
                Some(k)
            }
            Self::EnumSetOf(_) => None,
        }
    }

    /// Whether the raw value is expected to be a list.
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(
            self,
            Self::ArrayOf(_) | Self::ListOf(_) | Self::SetOf(_) | Self::EnumSetOf(_)
        )
    }

    /// Whether the raw value is expected to be a map.
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::MapOf(_))
    }

    /// Whether values of this kind name other components.
    #[must_use]
    pub fn refers_to_components(&self) -> bool {
        self.element().is_some_and(ScalarKind::is_component)
    }
}

impl From<ScalarKind> for ValueKind {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(k) => write!(f, "{k}"),
            Self::ArrayOf(k) => write!(f, "array<{k}>"),
            Self::ListOf(k) => write!(f, "list<{k}>"),
            Self::SetOf(k) => write!(f, "set<{k}>"),
            Self::EnumSetOf(e) => write!(f, "enum set<{}>", e.name()),
            Self::MapOf(k) => write!(f, "map<{k}>"),
        }
    }
}
