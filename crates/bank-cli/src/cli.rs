//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Soundbank Registry - Keep the bank registry in step with generated audio
#[derive(Parser, Debug)]
#[command(name = "bankreg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Apply a batch of added and removed soundbank files
    ///
    /// Paths are relative to the working directory and follow the
    /// import-root convention: <root>/<platform>[/<language>]/<file>.
    ///
    /// Examples:
    ///   bankreg apply -a GeneratedSoundBanks/Windows/Init.bnk
    ///   bankreg apply --delta last-generation.json
    ///   bankreg apply -r GeneratedSoundBanks/Windows/English/Music.bnk
    Apply {
        /// Path that appeared under the import root (repeatable)
        #[arg(short, long)]
        added: Vec<String>,

        /// Path that disappeared from the import root (repeatable)
        #[arg(short, long)]
        removed: Vec<String>,

        /// JSON document with "added" and "removed" path lists
        #[arg(long)]
        delta: Option<PathBuf>,

        /// Output the batch report as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show registry status overview
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List registered banks
    Banks {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one bank record in full
    Show {
        /// Logical bank name (e.g., "Music")
        name: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List distribution groups and their entry counts
    Groups {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verify the CLI is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from(["bankreg"]);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_verbose_flag() {
        let cli = Cli::parse_from(["bankreg", "--verbose"]);
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_apply_with_paths() {
        let cli = Cli::parse_from([
            "bankreg",
            "apply",
            "-a",
            "GeneratedSoundBanks/Windows/Init.bnk",
            "-a",
            "GeneratedSoundBanks/Windows/English/Music.bnk",
            "-r",
            "GeneratedSoundBanks/Windows/English/955.wem",
        ]);
        match cli.command {
            Some(Commands::Apply {
                added,
                removed,
                delta,
                json,
            }) => {
                assert_eq!(added.len(), 2);
                assert_eq!(removed, vec!["GeneratedSoundBanks/Windows/English/955.wem"]);
                assert_eq!(delta, None);
                assert!(!json);
            }
            _ => panic!("Expected Apply command"),
        }
    }

    #[test]
    fn parse_apply_with_delta_file() {
        let cli = Cli::parse_from(["bankreg", "apply", "--delta", "delta.json", "--json"]);
        match cli.command {
            Some(Commands::Apply { delta, json, .. }) => {
                assert_eq!(delta, Some(PathBuf::from("delta.json")));
                assert!(json);
            }
            _ => panic!("Expected Apply command"),
        }
    }

    #[test]
    fn parse_status_command() {
        let cli = Cli::parse_from(["bankreg", "status"]);
        assert!(matches!(cli.command, Some(Commands::Status { json: false })));
    }

    #[test]
    fn parse_status_json() {
        let cli = Cli::parse_from(["bankreg", "status", "--json"]);
        assert!(matches!(cli.command, Some(Commands::Status { json: true })));
    }

    #[test]
    fn parse_banks_command() {
        let cli = Cli::parse_from(["bankreg", "banks"]);
        assert!(matches!(cli.command, Some(Commands::Banks { json: false })));
    }

    #[test]
    fn parse_show_command() {
        let cli = Cli::parse_from(["bankreg", "show", "Music"]);
        match cli.command {
            Some(Commands::Show { name, json }) => {
                assert_eq!(name, "Music");
                assert!(!json);
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn parse_groups_command() {
        let cli = Cli::parse_from(["bankreg", "groups", "--json"]);
        assert!(matches!(cli.command, Some(Commands::Groups { json: true })));
    }

    #[test]
    fn verbose_flag_works_with_commands() {
        let cli = Cli::parse_from(["bankreg", "-v", "status"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Status { .. })));

        let cli = Cli::parse_from(["bankreg", "status", "--verbose"]);
        assert!(cli.verbose);
    }
}
