//! Domain Entity command-line administration.
//!
//! Enables domain access on entity kinds and configures the per-bundle
//! assignment settings stored in a local database.

mod commands;
mod config;
mod error;
mod formatter;
mod manifest;

use clap::Parser;
use config::Args;
use error::CliResult;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domain_entity=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> CliResult<()> {
    let (config, command) = args.into_parts();
    tracing::debug!(
        data_path = %config.data_path.display(),
        manifest = %config.manifest_path.display(),
        format = %config.format,
        "configuration loaded"
    );

    let app = commands::App::open(&config)?;
    let formatter = formatter::create_formatter(config.format);
    let output = app.execute(&command, &*formatter)?;
    println!("{}", output);
    Ok(())
}
