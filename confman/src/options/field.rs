//! Leaf option fields.
//!
//! An [`OptionField`] is a typed slot in an options tree. The binder turns
//! the command-line text into a [`TypedValue`] of the field's declared
//! [`ValueKind`] and hands it to [`OptionField::assign`].

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use url::Url;

use crate::component::{downcast, Configurable};
use crate::property::{FromTypedValue, SeededRandom, TypedValue};
use crate::schema::{ConfigEnum, EnumType, ScalarKind, ValueKind};

/// A bindable leaf of an options tree.
pub trait OptionField {
    /// The kind command-line values are coerced to.
    fn kind(&self) -> ValueKind;

    /// Stores a coerced value. Returns `false` if the value has the wrong
    /// shape for this field.
    fn assign(&mut self, value: TypedValue) -> bool;

    /// Whether the option is a flag that needs no value.
    fn is_flag(&self) -> bool {
        self.kind() == ValueKind::Scalar(ScalarKind::Bool)
    }
}

fn store<T: FromTypedValue>(slot: &mut T, value: TypedValue) -> bool {
    match T::from_typed(value) {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

macro_rules! option_fields {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl OptionField for $ty {
                fn kind(&self) -> ValueKind {
                    ValueKind::Scalar($kind)
                }

                fn assign(&mut self, value: TypedValue) -> bool {
                    store(self, value)
                }
            }

            impl OptionField for Option<$ty> {
                fn kind(&self) -> ValueKind {
                    ValueKind::Scalar($kind)
                }

                fn assign(&mut self, value: TypedValue) -> bool {
                    match <$ty>::from_typed(value) {
                        Some(v) => {
                            *self = Some(v);
                            true
                        }
                        None => false,
                    }
                }
            }

            impl OptionField for Vec<$ty> {
                fn kind(&self) -> ValueKind {
                    ValueKind::ListOf($kind)
                }

                fn assign(&mut self, value: TypedValue) -> bool {
                    store(self, value)
                }
            }
        )*
    };
}

option_fields! {
    bool => ScalarKind::Bool,
    i8 => ScalarKind::Byte,
    char => ScalarKind::Char,
    i16 => ScalarKind::Short,
    i32 => ScalarKind::Int,
    i64 => ScalarKind::Long,
    f32 => ScalarKind::Float,
    f64 => ScalarKind::Double,
    String => ScalarKind::String,
    PathBuf => ScalarKind::Path,
    Url => ScalarKind::Url,
    SeededRandom => ScalarKind::Random,
    DateTime<FixedOffset> => ScalarKind::DateTime,
    NaiveDate => ScalarKind::Date,
    NaiveTime => ScalarKind::Time,
}

impl<T: Configurable> OptionField for Option<Arc<T>> {
    fn kind(&self) -> ValueKind {
        ValueKind::Scalar(ScalarKind::component(T::TYPE_NAME))
    }

    fn assign(&mut self, value: TypedValue) -> bool {
        match value {
            TypedValue::Component(c) => match downcast::<T>(&c) {
                Some(typed) => {
                    *self = Some(typed);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

impl<T: Configurable> OptionField for Vec<Arc<T>> {
    fn kind(&self) -> ValueKind {
        ValueKind::ListOf(ScalarKind::component(T::TYPE_NAME))
    }

    fn assign(&mut self, value: TypedValue) -> bool {
        let (TypedValue::List(items) | TypedValue::Array(items) | TypedValue::Set(items)) = value else {
            return false;
        };
        let typed: Option<Vec<Arc<T>>> = items
            .into_iter()
            .map(|item| match item {
                TypedValue::Component(c) => downcast::<T>(&c),
                _ => None,
            })
            .collect();
        match typed {
            Some(list) => {
                *self = list;
                true
            }
            None => false,
        }
    }
}

/// An optional enum-valued option.
///
/// # Examples
///
/// ```
/// use confman::options::{EnumOption, OptionField};
/// use confman::{ConfigEnum, TypedValue};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Mode { Fast, Safe }
///
/// impl ConfigEnum for Mode {
///     const NAME: &'static str = "Mode";
///     const VARIANTS: &'static [&'static str] = &["FAST", "SAFE"];
///
///     fn from_variant(variant: &str) -> Option<Self> {
///         match variant {
///             "FAST" => Some(Self::Fast),
///             "SAFE" => Some(Self::Safe),
///             _ => None,
///         }
///     }
///
///     fn variant(self) -> &'static str {
///         match self {
///             Self::Fast => "FAST",
///             Self::Safe => "SAFE",
///         }
///     }
/// }
///
/// let mut mode = EnumOption::<Mode>::default();
/// assert!(mode.assign(TypedValue::enumeration(Mode::Safe)));
/// assert_eq!(mode.get(), Some(Mode::Safe));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumOption<E>(Option<E>);

impl<E> Default for EnumOption<E> {
    fn default() -> Self {
        Self(None)
    }
}

impl<E: ConfigEnum> EnumOption<E> {
    /// An option preset to `value`.
    #[must_use]
    pub const fn with_default(value: E) -> Self {
        Self(Some(value))
    }

    /// The bound variant, if any.
    #[must_use]
    pub fn get(&self) -> Option<E> {
        self.0
    }
}

impl<E: ConfigEnum> OptionField for EnumOption<E> {
    fn kind(&self) -> ValueKind {
        ValueKind::Scalar(ScalarKind::enumeration::<E>())
    }

    fn assign(&mut self, value: TypedValue) -> bool {
        match value {
            TypedValue::Enum(v) => v.to_enum::<E>().map(|e| self.0 = Some(e)).is_some(),
            _ => false,
        }
    }
}

/// A set of enum variants, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSetOption<E> {
    values: Vec<E>,
}

impl<E> Default for EnumSetOption<E> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<E: ConfigEnum> EnumSetOption<E> {
    /// The bound variants.
    #[must_use]
    pub fn values(&self) -> &[E] {
        &self.values
    }
}

impl<E: ConfigEnum> OptionField for EnumSetOption<E> {
    fn kind(&self) -> ValueKind {
        ValueKind::EnumSetOf(EnumType::of::<E>())
    }

    fn assign(&mut self, value: TypedValue) -> bool {
        let TypedValue::EnumSet(set) = value else {
            return false;
        };
        let mut values: Vec<E> = match set.iter().map(|v| v.to_enum::<E>()).collect() {
            Some(values) => values,
            None => return false,
        };
        values.sort_by_key(|e| E::VARIANTS.iter().position(|v| *v == e.variant()));
        self.values = values;
        true
    }
}
