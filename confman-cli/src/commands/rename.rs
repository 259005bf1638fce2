//! Rename command implementation.
//!
//! This module implements the `rename` command. References to the renamed
//! component are rewritten in properties of registered types; the CLI
//! registers none, so raw references in other records are left as written.

use crate::error::CliError;
use crate::utils::{load_manager, write_document, GlobalOptions};
use clap::Args;
use confman::SaveScope;
use std::path::PathBuf;

/// Rename a component and dump the result.
#[derive(Args)]
pub struct RenameCommand {
    /// Current component name
    #[arg(value_name = "OLD")]
    pub old: String,

    /// New component name
    #[arg(value_name = "NEW")]
    pub new: String,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RenameCommand {
    /// Execute the rename command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if self.new.trim().is_empty() {
            return Err(CliError::InvalidArguments(
                "new component name must not be empty".to_string(),
            ));
        }
        let manager = load_manager(global)?;
        manager.rename(&self.old, &self.new)?;
        if global.verbose {
            eprintln!("Renamed {} to {}", self.old, self.new);
        }
        write_document(&manager, SaveScope::All, self.output.as_deref())
    }
}
