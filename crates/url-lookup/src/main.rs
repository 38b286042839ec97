use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url_lookup::{lookup_file_url, UrlLookup};

/// Print the public link of a source document.
#[derive(Debug, Parser)]
#[command(name = "get-file-url", version)]
struct Cli {
    /// File name exactly as listed in the `File Name` column
    file_name: String,

    /// JSON config naming the URL mapping file
    #[arg(short, long, env = "URL_LOOKUP_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Log lookup details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = lookup_file_url(&cli.config, &cli.file_name)
        .with_context(|| format!("failed to look up {}", cli.file_name))?;

    match result {
        UrlLookup::Found(url) => {
            println!("{}", url);
            Ok(ExitCode::SUCCESS)
        }
        UrlLookup::FoundBlank => {
            eprintln!("{} is listed without a link", cli.file_name);
            Ok(ExitCode::FAILURE)
        }
        UrlLookup::NotFound => {
            eprintln!("{} is not in the URL mapping", cli.file_name);
            Ok(ExitCode::FAILURE)
        }
    }
}
