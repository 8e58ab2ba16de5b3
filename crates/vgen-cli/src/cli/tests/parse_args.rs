//! Tests for subcommand and flag parsing.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_run_short_flags() {
    match parse(&[
        "vgen", "run", "-p", "a cat", "-m", "sora-pro", "-t", "8", "-s", "720x1280", "-o", "/tmp/v",
        "-r", "~/ref.png",
    ]) {
        CliCommand::Run(args) => {
            assert_eq!(args.prompt.as_deref(), Some("a cat"));
            assert_eq!(args.model.as_deref(), Some("sora-pro"));
            assert_eq!(args.duration.as_deref(), Some("8"));
            assert_eq!(args.size.as_deref(), Some("720x1280"));
            assert_eq!(args.output_dir.as_deref(), Some(Path::new("/tmp/v")));
            assert_eq!(args.reference.as_deref(), Some("~/ref.png"));
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_long_flags() {
    match parse(&["vgen", "run", "--prompt", "waves", "--duration", "12", "--output-dir", "out"]) {
        CliCommand::Run(args) => {
            assert_eq!(args.prompt.as_deref(), Some("waves"));
            assert_eq!(args.duration.as_deref(), Some("12"));
            assert_eq!(args.output_dir.as_deref(), Some(Path::new("out")));
            assert!(args.model.is_none());
            assert!(args.size.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_session_without_prompt() {
    match parse(&["vgen", "session"]) {
        CliCommand::Session(args) => assert!(args.prompt.is_none()),
        _ => panic!("expected Session"),
    }
}

#[test]
fn cli_parse_list_default_limit() {
    match parse(&["vgen", "list"]) {
        CliCommand::List { limit } => assert_eq!(limit, 10),
        _ => panic!("expected List"),
    }
    match parse(&["vgen", "list", "--limit", "25"]) {
        CliCommand::List { limit } => assert_eq!(limit, 25),
        _ => panic!("expected List"),
    }
}

#[test]
fn cli_parse_purge() {
    match parse(&["vgen", "purge", "--limit", "3"]) {
        CliCommand::Purge { limit } => assert_eq!(limit, 3),
        _ => panic!("expected Purge"),
    }
}

#[test]
fn cli_parse_debug_is_global() {
    let cli = Cli::try_parse_from(["vgen", "run", "-p", "x", "--debug"]).unwrap();
    assert!(cli.debug);
    let cli = Cli::try_parse_from(["vgen", "-d", "list"]).unwrap();
    assert!(cli.debug);
    let cli = Cli::try_parse_from(["vgen", "list"]).unwrap();
    assert!(!cli.debug);
}

#[test]
fn cli_parse_rejects_unknown_subcommand_and_bad_limit() {
    assert!(Cli::try_parse_from(["vgen", "add", "x"]).is_err());
    assert!(Cli::try_parse_from(["vgen", "list", "--limit", "many"]).is_err());
    assert!(Cli::try_parse_from(["vgen"]).is_err());
}
