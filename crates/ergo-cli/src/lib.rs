//! ergo command-line interface.
//!
pub mod options;

use anyhow::{Context, bail};
use ergo::{DomainFile, DomainRegistry, Error, Info};
use serde_json::Value;

pub use options::{Cli, Command, DomainFileOptions, RenderOptions};

/// Main entry point. Returns the text to print.
pub fn run(cli: Cli) -> anyhow::Result<String> {
    match cli.command {
        Command::Check(opts) => check(&opts),
        Command::Render(opts) => render(&opts),
    }
}

fn load_registry(opts: &DomainFileOptions) -> anyhow::Result<(DomainFile, DomainRegistry)> {
    let file = DomainFile::load(&opts.domains)?;
    let registry = DomainRegistry::new();
    registry
        .try_register_file(&file)
        .with_context(|| format!("invalid domain file {}", opts.domains.display()))?;
    tracing::info!(domains = file.len(), "domain file loaded");
    Ok((file, registry))
}

fn check(opts: &DomainFileOptions) -> anyhow::Result<String> {
    let (file, _) = load_registry(opts)?;

    let mut out = String::new();
    for (name, map) in file.domains() {
        let codes: Vec<String> = map.keys().map(|code| code.to_string()).collect();
        out.push_str(&format!("{}: {}\n", name, codes.join(", ")));
    }
    Ok(out)
}

fn render(opts: &RenderOptions) -> anyhow::Result<String> {
    let (_, registry) = load_registry(&opts.file)?;
    let info = parse_info(&opts.info)?;

    let err = Error::make(0, opts.domain.as_str(), opts.code, info);
    let text = if opts.full {
        err.full_text_in(&registry)
    } else {
        let mut message = err.message_in(&registry);
        message.push('\n');
        message
    };
    Ok(text)
}

/// Parse `key=value` entries; values that are not valid JSON stay strings.
pub fn parse_info(entries: &[String]) -> anyhow::Result<Info> {
    let mut info = Info::new();
    for entry in entries {
        let Some((key, raw)) = entry.split_once('=') else {
            bail!("info entry '{}' is not KEY=VALUE", entry);
        };
        if key.is_empty() {
            bail!("info entry '{}' has an empty key", entry);
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        info.insert(key, value);
    }
    Ok(info)
}
