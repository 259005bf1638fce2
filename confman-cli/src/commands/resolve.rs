//! Resolve command implementation.
//!
//! This module implements the `resolve` command, which substitutes global
//! properties in an arbitrary expression.

use crate::error::CliError;
use crate::utils::{load_manager, GlobalOptions};
use clap::Args;

/// Label used in errors raised while resolving an expression.
const EXPRESSION_OWNER: &str = "<expression>";

/// Substitute global properties in an expression.
#[derive(Args)]
pub struct ResolveCommand {
    /// Expression containing ${name} references
    #[arg(value_name = "EXPR", allow_hyphen_values = true)]
    pub expression: String,
}

impl ResolveCommand {
    /// Execute the resolve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let manager = load_manager(global)?;
        let resolved = manager.substitute(EXPRESSION_OWNER, "value", &self.expression)?;
        println!("{resolved}");
        Ok(())
    }
}
