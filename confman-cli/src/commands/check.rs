//! Check command implementation.
//!
//! This module implements the `check` command, which substitutes every raw
//! value of every component and reports the first one that fails.

use crate::error::CliError;
use crate::utils::{load_manager, substitute_value, GlobalOptions};
use clap::Args;

/// Check that every property value substitutes.
#[derive(Args)]
pub struct CheckCommand {
    /// Only check these components
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

impl CheckCommand {
    /// Execute the check command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let manager = load_manager(global)?;

        let names = if self.names.is_empty() {
            manager.component_names()
        } else {
            self.names
        };

        let mut checked = 0usize;
        for name in &names {
            let record = manager
                .record(name)
                .ok_or_else(|| CliError::SemanticFailure(format!("no component named '{name}'")))?;
            for (property, value) in record.properties() {
                substitute_value(&manager, name, property, value)
                    .map_err(|e| CliError::SemanticFailure(e.to_string()))?;
                checked += 1;
            }
        }

        if global.verbose {
            eprintln!("Checked {checked} values in {} components", names.len());
        }
        if !global.quiet {
            println!("ok");
        }
        Ok(())
    }
}
