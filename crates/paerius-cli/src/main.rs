//! Paerius CLI - prunes a project's vendor tree and packs it into a
//! self-executing Phar archive.

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    logging::init(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let (operation, result) = match &cli.command {
        cli::Commands::Build(args) => (
            "build",
            commands::build::execute(args, cli.config.as_deref(), &*formatter, cli.quiet),
        ),
        cli::Commands::Prune(args) => (
            "prune",
            commands::prune::execute(args, cli.config.as_deref(), &*formatter),
        ),
        cli::Commands::List(args) => ("list", commands::list::execute(args, &*formatter)),
        cli::Commands::Verify(args) => ("verify", commands::verify::execute(args, &*formatter)),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            ("completion", Ok(()))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(operation, &err);
            ExitCode::FAILURE
        }
    }
}
