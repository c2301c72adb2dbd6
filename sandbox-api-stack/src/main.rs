use std::fs;
use std::path::PathBuf;

use clap::Parser;
use sandbox_api_stack::{ApiStack, StackError};
use tracing_subscriber::EnvFilter;

/// Synthesizes the sandbox-api CloudFormation template.
#[derive(Debug, Parser)]
#[command(name = "synth", version, about)]
struct Args {
    /// Write the template here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit single-line JSON.
    #[arg(long)]
    compact: bool,

    /// Extra stack-wide tag as KEY=VALUE; may repeat.
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

fn main() -> Result<(), StackError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "sandbox_api_stack=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let stack = args
        .tags
        .into_iter()
        .fold(ApiStack::sandbox(), |stack, (key, value)| stack.tag(key, value));
    let json = stack.synthesize()?.to_json(!args.compact)?;

    match args.output {
        Some(path) => {
            fs::write(&path, json)?;
            tracing::info!(path = %path.display(), "wrote template");
        }
        None => println!("{json}"),
    }
    Ok(())
}
