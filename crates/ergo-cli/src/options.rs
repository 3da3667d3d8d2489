//! Command-line options of the `ergo` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ergo",
    about = "ergo: check domain files and render structured errors",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every template of a domain file and list the declared codes
    Check(DomainFileOptions),

    /// Build an error and print its message
    Render(RenderOptions),
}

/// Location of the domain file.
#[derive(Args, Debug, Clone)]
pub struct DomainFileOptions {
    /// TOML file with one table of code templates per domain
    #[arg(short = 'd', long = "domains", value_name = "FILE")]
    pub domains: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RenderOptions {
    #[command(flatten)]
    pub file: DomainFileOptions,

    /// Domain of the error
    #[arg(long)]
    pub domain: String,

    /// Code of the error within its domain
    #[arg(long, allow_negative_numbers = true)]
    pub code: i32,

    /// Info entry (repeatable). Values are parsed as JSON when possible.
    #[arg(
        short = 'i',
        long = "info",
        value_name = "KEY=VALUE",
        action = clap::ArgAction::Append
    )]
    pub info: Vec<String>,

    /// Print the full text with stack context instead of the message
    #[arg(long, default_value_t = false)]
    pub full: bool,
}
