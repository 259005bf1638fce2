//! `confman completions <SHELL>`.
//!
//! Writes a clap_complete script for the chosen shell to stdout, with short
//! install hints on stderr.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

/// Name of the installed binary.
const BIN_NAME: &str = "confman";

/// Print a shell completion script
#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Execute the completions command.
    ///
    /// The script goes to stdout; installation hints go to stderr as
    /// comments unless `--quiet` is set.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        if !global.quiet {
            eprintln!("# Generating {} completion script", self.shell);
            for hint in install_hints(self.shell) {
                eprintln!("#   {hint}");
            }
            eprintln!();
        }

        let mut cmd = Cli::command();
        generate(self.shell, &mut cmd, BIN_NAME, &mut io::stdout());
        Ok(())
    }
}

fn install_hints(shell: Shell) -> Vec<&'static str> {
    match shell {
        Shell::Bash => vec![
            "confman completions bash > ~/.local/share/bash-completion/completions/confman",
            "or in ~/.bashrc: eval \"$(confman completions bash)\"",
        ],
        Shell::Zsh => vec![
            "confman completions zsh > ~/.zsh/completions/_confman",
            "with ~/.zsh/completions in your $fpath",
        ],
        Shell::Fish => vec!["confman completions fish > ~/.config/fish/completions/confman.fish"],
        Shell::PowerShell => {
            vec!["confman completions powershell | Out-String | Invoke-Expression"]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_common_shell_has_hints() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
            assert!(!install_hints(shell).is_empty(), "{shell}");
        }
        assert!(install_hints(Shell::Elvish).is_empty());
    }
}
