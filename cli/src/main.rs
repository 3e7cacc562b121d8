use std::io::IsTerminal;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod normalize;
mod output;
mod resolve;
mod utils;

use error::Result;

#[derive(Parser)]
#[command(name = "kagi")]
#[command(about = "Resolve key-pair credentials into canonical PKCS#8 keys", long_about = None)]
struct Cli {
    /// Log resolution steps to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the private key of a profile target
    Resolve {
        #[command(flatten)]
        config: resolve::Config,
    },
    /// Re-encode one private key file as unencrypted PKCS#8
    Normalize {
        #[command(flatten)]
        config: normalize::Config,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Resolve { config } => resolve::execute(config)?,
        Commands::Normalize { config } => normalize::execute(config)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
