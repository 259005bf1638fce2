//! Error types for the confman library.
//!
//! Every failure in the engine is fail-fast: errors are raised to the
//! immediate caller of the operation that detected them and nothing is
//! retried. Coercion errors always carry the component and property names
//! so a bad configuration file can be diagnosed without a debugger.

use thiserror::Error;

/// Result type alias for operations that may fail with a confman error.
///
/// # Examples
///
/// ```
/// use confman::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(8080)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by post-configuration hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for the confman library.
#[derive(Debug, Error)]
pub enum Error {
    /// A raw record sets a property its type does not declare.
    #[error("component '{component}' of type '{type_name}' has no property '{property}'")]
    UnknownPropertyInConfig {
        /// The component whose record is invalid.
        component: String,
        /// The type the component was bound to.
        type_name: String,
        /// The undeclared property.
        property: String,
    },

    /// A mandatory property has no value after substitution.
    #[error("mandatory property '{property}' of component '{component}' is not set")]
    MissingMandatoryProperty {
        /// The component being configured.
        component: String,
        /// The property without a value.
        property: String,
    },

    /// A raw value could not be parsed as the declared kind.
    #[error("cannot parse '{value}' as {kind} for property '{property}' of component '{component}'")]
    MalformedValue {
        /// The component being configured.
        component: String,
        /// The property being coerced.
        property: String,
        /// The expected value kind.
        kind: String,
        /// The offending (substituted) raw value.
        value: String,
    },

    /// A value has the wrong shape or refers to an incompatible type.
    #[error("type mismatch for property '{property}' of component '{component}': {details}")]
    TypeMismatch {
        /// The component being configured.
        component: String,
        /// The property being coerced.
        property: String,
        /// Details about the mismatch.
        details: String,
    },

    /// An enum set contains a literal the enum does not define.
    #[error("'{value}' is not a variant of {enum_name} (property '{property}' of component '{component}')")]
    InvalidEnumValue {
        /// The component being configured.
        component: String,
        /// The property being coerced.
        property: String,
        /// The enum type name.
        enum_name: String,
        /// The unrecognized literal.
        value: String,
    },

    /// A `${name}` reference names no global property.
    #[error("unknown global property '{name}' referenced by property '{property}' of component '{component}'")]
    UnknownGlobalProperty {
        /// The component owning the raw value.
        component: String,
        /// The property owning the raw value.
        property: String,
        /// The unresolved global property name.
        name: String,
    },

    /// Global properties reference each other in a cycle.
    #[error("cyclic global property reference in property '{property}' of component '{component}': {}", .cycle.join(" -> "))]
    CyclicGlobalProperty {
        /// The component owning the raw value.
        component: String,
        /// The property owning the raw value.
        property: String,
        /// The global property names forming the cycle, first name repeated last.
        cycle: Vec<String>,
    },

    /// No component is registered under the given name.
    #[error("unknown component '{name}'")]
    UnknownComponent {
        /// The requested component name.
        name: String,
    },

    /// Components reference each other in a cycle.
    #[error("cyclic component reference: {}", .cycle.join(" -> "))]
    CyclicComponentReference {
        /// The component names forming the cycle, first name repeated last.
        cycle: Vec<String>,
    },

    /// A record names a type with no registered schema.
    #[error("component '{component}' has unregistered type '{type_name}'")]
    UnknownType {
        /// The component naming the type.
        component: String,
        /// The unregistered type name.
        type_name: String,
    },

    /// A component schema violates the schema contract.
    #[error("invalid schema for type '{type_name}': {reason}")]
    InvalidSchema {
        /// The type whose schema is invalid.
        type_name: String,
        /// Why the schema was rejected.
        reason: String,
    },

    /// A component name is already taken.
    #[error("component '{name}' already exists")]
    DuplicateComponent {
        /// The colliding name.
        name: String,
    },

    /// Two options share a long name or short character.
    #[error("duplicate option name '{option}'")]
    DuplicateOptionName {
        /// The colliding option, as written on the command line.
        option: String,
    },

    /// A command-line option is not declared by the options tree.
    #[error("unknown option '{option}'")]
    UnknownOption {
        /// The option as written on the command line.
        option: String,
    },

    /// A command-line option that takes a value was given none.
    #[error("option '{option}' requires a value")]
    MissingOptionValue {
        /// The option as written on the command line.
        option: String,
    },

    /// An override names no known component, property or global.
    #[error("unknown override target '{target}'")]
    UnknownOverrideTarget {
        /// The override key.
        target: String,
    },

    /// A configuration source could not be resolved, read or parsed.
    #[error("failed to load configuration from '{location}': {reason}")]
    ConfigLoadError {
        /// The location that failed.
        location: String,
        /// The reason loading failed.
        reason: String,
    },

    /// A write model could not emit the registry.
    #[error("failed to write configuration: {reason}")]
    ConfigWriteError {
        /// The reason writing failed.
        reason: String,
    },

    /// A component's post-configuration hook failed.
    #[error("post-configuration of component '{component}' failed: {source}")]
    PostConfigFailure {
        /// The component whose hook failed.
        component: String,
        /// The error raised by the hook.
        #[source]
        source: BoxError,
    },

    /// The user asked for usage text. Not a failure.
    #[error("{usage}")]
    UsageRequested {
        /// The formatted usage text.
        usage: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is the `--help`/`--usage` control-flow signal.
    ///
    /// # Examples
    ///
    /// ```
    /// use confman::Error;
    ///
    /// let err = Error::UsageRequested { usage: "Usage: app".to_string() };
    /// assert!(err.is_usage_request());
    /// ```
    #[must_use]
    pub fn is_usage_request(&self) -> bool {
        matches!(self, Self::UsageRequested { .. })
    }

    /// Check if error indicates a component does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use confman::Error;
    ///
    /// let err = Error::UnknownComponent { name: "frontend".to_string() };
    /// assert!(err.is_unknown_component());
    /// ```
    #[must_use]
    pub fn is_unknown_component(&self) -> bool {
        matches!(self, Self::UnknownComponent { .. })
    }

    /// Check if error was raised while loading or writing configuration.
    #[must_use]
    pub fn is_config_io(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoadError { .. } | Self::ConfigWriteError { .. } | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_property_error() {
        let err = Error::UnknownPropertyInConfig {
            component: "frontend".to_string(),
            type_name: "Frontend".to_string(),
            property: "sampleRate".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("frontend"));
        assert!(display.contains("Frontend"));
        assert!(display.contains("sampleRate"));
    }

    #[test]
    fn test_malformed_value_error() {
        let err = Error::MalformedValue {
            component: "a".to_string(),
            property: "count".to_string(),
            kind: "int".to_string(),
            value: "seven".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("'seven'"));
        assert!(display.contains("int"));
        assert!(display.contains("count"));
    }

    #[test]
    fn test_cyclic_global_property_error() {
        let err = Error::CyclicGlobalProperty {
            component: "a".to_string(),
            property: "one".to_string(),
            cycle: vec!["X".to_string(), "Y".to_string(), "X".to_string()],
        };
        let display = format!("{err}");
        assert!(display.contains("X -> Y -> X"));
    }

    #[test]
    fn test_cyclic_component_error() {
        let err = Error::CyclicComponentReference {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert!(format!("{err}").contains("a -> b -> a"));
    }

    #[test]
    fn test_usage_requested_displays_usage_only() {
        let err = Error::UsageRequested {
            usage: "Usage: app [options]".to_string(),
        };
        assert_eq!(format!("{err}"), "Usage: app [options]");
        assert!(err.is_usage_request());
        assert!(!err.is_unknown_component());
    }

    #[test]
    fn test_post_config_failure_keeps_source() {
        use std::error::Error as _;

        let err = Error::PostConfigFailure {
            component: "decoder".to_string(),
            source: "beam width must be positive".into(),
        };
        assert!(format!("{err}").contains("decoder"));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "beam width must be positive");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(format!("{err}").contains("I/O error"));
        assert!(err.is_config_io());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<u16> {
            Err(Error::UnknownComponent {
                name: "missing".to_string(),
            })
        }

        assert!(returns_result().unwrap_err().is_unknown_component());
    }
}
