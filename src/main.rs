use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wiretap::{Config, SafeSerializer, Value};

/// Serialize a JSON document through the bounded, cycle-safe serializer.
#[derive(Debug, Parser)]
#[command(name = "wiretap", version, about)]
struct Cli {
    /// Input file (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Config file (defaults to <data-dir>/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory (defaults to ~/.wiretap)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Own-key count above which a plain object is summarized
    #[arg(long)]
    key_limit: Option<usize>,

    /// Nested plain-object depth at which an object is summarized
    #[arg(long)]
    depth_limit: Option<usize>,

    /// Maximum length of summarized strings (0 = unbounded)
    #[arg(long)]
    string_length_limit: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    wiretap::util::init_data_dir(cli.data_dir.clone());

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load(),
    };
    if let Some(limit) = cli.key_limit {
        config.serializer.key_limit = limit;
    }
    if let Some(limit) = cli.depth_limit {
        config.serializer.depth_limit = limit;
    }
    if let Some(limit) = cli.string_length_limit {
        config.serializer.string_length_limit = Some(limit);
    }

    let raw = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let document: serde_json::Value =
        serde_json::from_str(&raw).context("input is not valid JSON")?;

    let serializer = SafeSerializer::new(config.serializer);
    println!("{}", serializer.serialize(&Value::from(document)));
    Ok(())
}
