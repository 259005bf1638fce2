//! Show command implementation.
//!
//! This module implements the `show` command, which displays the raw
//! properties of one component with global properties substituted.

use crate::error::CliError;
use crate::utils::{
    column_width, load_manager, print_structured, substitute_value, GlobalOptions, OutputFormat,
};
use clap::Args;
use confman::document::property_to_value;
use confman::Error as LibError;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::io::Write;

/// Show the properties of a component.
#[derive(Args)]
pub struct ShowCommand {
    /// Component name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Print values as written, without substituting globals
    #[arg(long)]
    pub raw: bool,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "text",
        env = "CONFMAN_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ComponentView {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    properties: Mapping,
}

impl ShowCommand {
    /// Execute the show command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let manager = load_manager(global)?;
        let record = manager
            .record(&self.name)
            .ok_or_else(|| LibError::UnknownComponent {
                name: self.name.clone(),
            })?;

        let mut values = Vec::new();
        for (property, value) in record.properties() {
            let shown = if self.raw {
                value.clone()
            } else {
                substitute_value(&manager, record.name(), property, value)?
            };
            values.push((property.to_string(), shown));
        }

        if self.format == OutputFormat::Text {
            let mut stdout = std::io::stdout().lock();
            if !global.quiet {
                writeln!(stdout, "{} ({})", record.name(), record.type_name())?;
            }
            let width = column_width(values.iter().map(|(k, _)| k.as_str()));
            for (property, value) in &values {
                writeln!(stdout, "{property:<width$} = {value}")?;
            }
            return Ok(());
        }

        let view = ComponentView {
            name: record.name().to_string(),
            type_name: record.type_name().to_string(),
            properties: values
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), property_to_value(v)))
                .collect(),
        };
        print_structured(&view, self.format)
    }
}
