//! Dump command implementation.
//!
//! This module implements the `dump` command, which writes the merged,
//! overridden configuration as a YAML document that loads back unchanged.

use crate::error::CliError;
use crate::utils::{load_manager, write_document, GlobalOptions};
use clap::Args;
use confman::SaveScope;
use std::path::PathBuf;

/// Write the merged configuration document.
#[derive(Args)]
pub struct DumpCommand {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl DumpCommand {
    /// Execute the dump command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let manager = load_manager(global)?;
        write_document(&manager, SaveScope::All, self.output.as_deref())?;
        if let Some(path) = &self.output {
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
        }
        Ok(())
    }
}
