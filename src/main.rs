//! kibsync CLI entry point.

use clap::Parser;
use kibsync::cli::{commands, Cli, Commands};
use kibsync::config::Config;
use kibsync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    // Completions need no credentials; everything else resolves the
    // configuration once and threads it through.
    if let Commands::Completions { shell } = &cli.command {
        return commands::completions::execute(*shell);
    }

    let root = std::env::current_dir()?;
    let config = Config::resolve(cli.env_file.as_deref(), cli.space.clone(), cli.debug)?;

    match &cli.command {
        Commands::Init { types, force } => {
            commands::init::execute(&config, &root, types.as_deref(), *force)
        }
        Commands::Auth => commands::auth::execute(&config),
        Commands::Add { refs } => commands::add::execute(&config, &root, refs),
        Commands::Pull => commands::pull::execute(&config, &root),
        Commands::Push => commands::push::execute(&config, &root, false),
        Commands::Togo => commands::togo::execute(&config, &root),
        Commands::Diff => commands::diff::execute(&config, &root),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
