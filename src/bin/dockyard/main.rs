//! dockyard CLI - Ninja build-file generator for C and C++

use anyhow::{Context, Result};
use clap::Parser;
use miette::{GraphicalReportHandler, GraphicalTheme};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use dockyard::builder::GenerationError;
use dockyard::util::diagnostic::{emit, suggestions, DescriptorParseError};
use dockyard::util::GlobalContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("dockyard=debug")
    } else {
        EnvFilter::new("dockyard=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    let ctx = match &cli.directory {
        Some(dir) => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            GlobalContext::with_cwd(cwd.join(dir))?
        }
        None => GlobalContext::new()?,
    };

    // Execute command
    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &ctx),
        Commands::Plan(args) => commands::plan::execute(args, &ctx),
        Commands::Clean(args) => commands::clean::execute(args, &ctx),
    }
}

/// Print an error, using the richest renderer available for it.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(parse) = err
        .chain()
        .find_map(|e| e.downcast_ref::<DescriptorParseError>())
    {
        let theme = if color {
            GraphicalTheme::unicode()
        } else {
            GraphicalTheme::unicode_nocolor()
        };
        let mut out = String::new();
        if GraphicalReportHandler::new_themed(theme)
            .render_report(&mut out, parse)
            .is_ok()
        {
            eprint!("{}", out);
            return;
        }
    }

    if let Some(generation) = err
        .chain()
        .find_map(|e| e.downcast_ref::<GenerationError>())
    {
        emit(
            &generation
                .to_diagnostic()
                .with_suggestion(suggestions::GENERATE_FAILED.trim_start_matches("help: ")),
            color,
        );
        return;
    }

    eprintln!("error: {:#}", err);
}
