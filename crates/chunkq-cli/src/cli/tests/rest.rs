//! Tests for config and completions subcommands.

use super::{parse, parse_err};
use crate::cli::CliCommand;
use clap_complete::Shell;

#[test]
fn cli_parse_config() {
    match parse(&["chunkq", "config"]) {
        CliCommand::Config => {}
        other => panic!("expected Config, got {:?}", other),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["chunkq", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        other => panic!("expected Completions, got {:?}", other),
    }
}

#[test]
fn cli_parse_unknown_subcommand_fails() {
    parse_err(&["chunkq", "frobnicate"]);
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    crate::cli::Cli::command().debug_assert();
}
