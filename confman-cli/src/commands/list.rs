//! List command implementation.
//!
//! This module implements the `list` command, which displays every
//! component with its type followed by the explicit global properties.

use crate::error::CliError;
use crate::utils::{column_width, load_manager, print_structured, GlobalOptions, OutputFormat};
use clap::Args;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::io::Write;

/// List components and global properties.
#[derive(Args)]
pub struct ListCommand {
    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "text",
        env = "CONFMAN_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: OutputFormat,

    /// Only list components of this type
    #[arg(long, value_name = "TYPE")]
    pub filter_type: Option<String>,

    /// Omit global properties
    #[arg(long)]
    pub components_only: bool,
}

#[derive(Serialize)]
struct ComponentSummary {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

#[derive(Serialize)]
struct Listing {
    components: Vec<ComponentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Mapping>,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let manager = load_manager(global)?;

        let components: Vec<ComponentSummary> = manager
            .component_names()
            .into_iter()
            .filter_map(|name| manager.record(&name))
            .filter(|record| {
                self.filter_type
                    .as_deref()
                    .map_or(true, |t| record.type_name() == t)
            })
            .map(|record| ComponentSummary {
                name: record.name().to_string(),
                type_name: record.type_name().to_string(),
            })
            .collect();

        let properties = if self.components_only {
            None
        } else {
            Some(
                manager
                    .global_properties()
                    .iter()
                    .map(|(k, v)| (Value::from(k), Value::from(v)))
                    .collect::<Mapping>(),
            )
        };

        let listing = Listing {
            components,
            properties,
        };

        match self.format {
            OutputFormat::Text => print_text(&listing, global.quiet)?,
            format => print_structured(&listing, format)?,
        }

        Ok(())
    }
}

fn print_text(listing: &Listing, quiet: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();

    let width = column_width(
        listing
            .components
            .iter()
            .map(|c| c.name.as_str())
            .chain(std::iter::once("COMPONENT")),
    );
    if !quiet {
        writeln!(stdout, "{:<width$}  TYPE", "COMPONENT")?;
    }
    for component in &listing.components {
        writeln!(stdout, "{:<width$}  {}", component.name, component.type_name)?;
    }

    if let Some(properties) = &listing.properties {
        if properties.is_empty() {
            return Ok(());
        }
        let entries: Vec<(&str, &str)> = properties
            .iter()
            .filter_map(|(k, v)| Some((k.as_str()?, v.as_str()?)))
            .collect();
        let width = column_width(
            entries
                .iter()
                .map(|(k, _)| *k)
                .chain(std::iter::once("PROPERTY")),
        );
        writeln!(stdout)?;
        if !quiet {
            writeln!(stdout, "{:<width$}  VALUE", "PROPERTY")?;
        }
        for (key, value) in entries {
            writeln!(stdout, "{key:<width$}  {value}")?;
        }
    }

    Ok(())
}
