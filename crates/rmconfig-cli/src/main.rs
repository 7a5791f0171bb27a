//! rmconfig - check and resolve resource manager configuration.
//!
//! This is the entry point for the `rmconfig` binary.
//!
//! # Commands
//!
//! - `rmconfig check <file>` - decode, resolve and validate; prints the
//!   violation report and exits non-zero if the document is invalid
//! - `rmconfig resolve <file>` - print the fully defaulted document

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::OutputFormat;

/// rmconfig - check and resolve resource manager configuration.
#[derive(Parser, Debug)]
#[command(name = "rmconfig")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging.
    #[arg(long, global = true, default_value = "false")]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a configuration document.
    Check {
        /// Path of the YAML or JSON document.
        #[arg(env = "RMCONFIG_FILE")]
        file: PathBuf,
    },
    /// Print a configuration document with every default filled in.
    Resolve {
        /// Path of the YAML or JSON document.
        #[arg(env = "RMCONFIG_FILE")]
        file: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    if args.debug {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn,rmconfig=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let result = match &args.command {
        Command::Check { file } => commands::check(file),
        Command::Resolve { file, format } => commands::resolve(file, *format),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
