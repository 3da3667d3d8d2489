use std::process::ExitCode;

use clap::Parser;
use ergo_cli::{Cli, run};

pub fn main() -> ExitCode {
    // Initialize tracing subscriber for logging
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let args = Cli::parse();
    match run(args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            tracing::error!(error = %e, "execution failed");
            ExitCode::FAILURE
        }
    }
}
