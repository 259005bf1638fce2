//! Errors raised by `confman` subcommands and the process exit codes they map to.

use confman::Error as LibError;
use std::fmt;

/// A failed subcommand.
#[derive(Debug)]
pub enum CliError {
    /// Any other engine error.
    Library(LibError),

    /// Arguments clap accepted but the command cannot use.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// A configuration document could not be loaded or written.
    Config(LibError),

    /// Semantic failure (e.g. a value that does not substitute) - exit code 1.
    SemanticFailure(String),
}

impl CliError {
    /// The process exit code.
    ///
    /// | code | meaning |
    /// |------|---------|
    /// | 1 | `check` found a value that does not substitute |
    /// | 4 | unusable arguments |
    /// | 5 | I/O failure |
    /// | 6 | engine error |
    /// | 7 | configuration could not be loaded or written |
    ///
    /// clap itself exits with 2 on a parse error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SemanticFailure(_) => 1,
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Library(_) => 6,
            CliError::Config(_) => 7,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::SemanticFailure(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) | CliError::Config(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        match e {
            LibError::ConfigLoadError { .. } | LibError::ConfigWriteError { .. } => {
                CliError::Config(e)
            }
            LibError::UnknownOverrideTarget { target } => {
                CliError::InvalidArguments(format!("no component or property named '{target}'"))
            }
            LibError::Io(e) => CliError::Io(e),
            other => CliError::Library(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_errors_map_to_config_exit_code() {
        let err = CliError::from(LibError::ConfigLoadError {
            location: "missing.yaml".to_string(),
            reason: "not found".to_string(),
        });
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_override_target_is_invalid_argument() {
        let err = CliError::from(LibError::UnknownOverrideTarget {
            target: "web.colour".to_string(),
        });
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("web.colour"));
    }

    #[test]
    fn test_other_library_errors() {
        let err = CliError::from(LibError::UnknownComponent {
            name: "ghost".to_string(),
        });
        assert_eq!(err.exit_code(), 6);
    }
}
