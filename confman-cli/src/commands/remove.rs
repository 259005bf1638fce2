//! Remove command implementation.

use crate::error::CliError;
use crate::utils::{load_manager, write_document, GlobalOptions};
use clap::Args;
use confman::SaveScope;
use std::path::PathBuf;

/// Remove a component and dump the result.
#[derive(Args)]
pub struct RemoveCommand {
    /// Component name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RemoveCommand {
    /// Execute the remove command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let manager = load_manager(global)?;
        manager.remove(&self.name)?;
        if global.verbose {
            eprintln!("Removed {}", self.name);
        }
        write_document(&manager, SaveScope::All, self.output.as_deref())
    }
}
