//! Helpers shared by the subcommands: building the registry from the global
//! flags, substituting raw values and printing structured output.

use crate::error::CliError;
use clap::ValueEnum;
use confman::options::Tokenizer;
use confman::{ConfigurationManager, ListItem, PropertyValue, SaveScope, YamlLoader};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Flags every subcommand sees.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Log debug messages.
    pub verbose: bool,

    /// Print only the requested output.
    pub quiet: bool,

    /// Comma-separated configuration locations.
    pub config_file: Option<String>,

    /// `KEY=VALUE` overrides, applied in order after loading.
    pub overrides: Vec<String>,
}

/// Output format for commands that print structured data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Build a registry from the global options.
///
/// Locations from `--config-file` are loaded in order with resource roots
/// taken from the environment, then every `--set` override is applied.
pub fn load_manager(global: &GlobalOptions) -> Result<ConfigurationManager, CliError> {
    let manager = ConfigurationManager::new();

    if let Some(list) = &global.config_file {
        let locations: Vec<String> = Tokenizer::default()
            .split(list)
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if locations.is_empty() {
            return Err(CliError::InvalidArguments(
                "--config-file names no locations".to_string(),
            ));
        }
        manager.load(&YamlLoader::from_env(), &locations)?;
    }

    for entry in &global.overrides {
        let (key, value) = parse_override(entry)?;
        manager.apply_override(key, value)?;
    }

    Ok(manager)
}

/// Split a `KEY=VALUE` override at the first `=`.
pub fn parse_override(entry: &str) -> Result<(&str, &str), CliError> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(CliError::InvalidArguments(format!(
            "override '{entry}' is not of the form KEY=VALUE"
        ))),
    }
}

/// Substitute globals in every string of a raw value.
///
/// Type references in lists are kept as they are.
pub fn substitute_value(
    manager: &ConfigurationManager,
    owner: &str,
    property: &str,
    value: &PropertyValue,
) -> confman::Result<PropertyValue> {
    Ok(match value {
        PropertyValue::Scalar(raw) => {
            PropertyValue::Scalar(manager.substitute(owner, property, raw)?)
        }
        PropertyValue::List(items) => PropertyValue::List(
            items
                .iter()
                .map(|item| match item {
                    ListItem::Value(raw) => manager
                        .substitute(owner, property, raw)
                        .map(ListItem::Value),
                    ListItem::TypeRef(t) => Ok(ListItem::TypeRef(t.clone())),
                })
                .collect::<confman::Result<_>>()?,
        ),
        PropertyValue::Map(entries) => PropertyValue::Map(
            entries
                .iter()
                .map(|(k, raw)| Ok((k.clone(), manager.substitute(owner, property, raw)?)))
                .collect::<confman::Result<_>>()?,
        ),
    })
}

/// Print a serializable value as JSON or YAML.
///
/// `Text` is handled by each command and is rejected here.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), CliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| CliError::InvalidArguments(format!("cannot render JSON: {e}")))?,
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| CliError::InvalidArguments(format!("cannot render YAML: {e}")))?,
        OutputFormat::Text => {
            return Err(CliError::InvalidArguments(
                "text output is not structured".to_string(),
            ))
        }
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered.trim_end())?;
    Ok(())
}

/// Write the registry as YAML to `output`, or to stdout when absent.
pub fn write_document(
    manager: &ConfigurationManager,
    scope: SaveScope,
    output: Option<&Path>,
) -> Result<(), CliError> {
    match output {
        Some(path) => manager.save_to_path(path, scope)?,
        None => {
            let text = manager.save_to_string(scope)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
        }
    }
    Ok(())
}

/// Pad a column of labels to a common width.
pub fn column_width<'a>(labels: impl IntoIterator<Item = &'a str>) -> usize {
    labels.into_iter().map(str::len).max().unwrap_or(0)
}
