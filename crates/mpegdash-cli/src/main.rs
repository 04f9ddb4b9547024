//! MPEG-DASH engine CLI - headless harness for the engine adapter
//!
//! Features:
//! - Source picking against the engine's MIME type
//! - Capability query
//! - Scenario replay through the simulated surface and streaming engine

use clap::{Parser, Subcommand};
use mpegdash_engine::SourceDescriptor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod scenario;

/// MPEG-DASH engine adapter toolkit
#[derive(Parser)]
#[command(name = "mpegdash-cli")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Headless harness for the MPEG-DASH engine adapter", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick the source the engine would play
    Pick {
        /// Candidate source as <type>=<url>, in host order
        #[arg(short, long = "source", value_parser = parse_source, required = true)]
        sources: Vec<SourceDescriptor>,
    },

    /// Check whether a content type is handled
    CanPlay {
        /// MIME type
        mime_type: String,
    },

    /// Replay a scenario against a simulated engine
    Replay {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Engine configuration file (JSON), overrides the scenario's
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Force host autoplay on
        #[arg(long)]
        autoplay: bool,
    },
}

fn parse_source(value: &str) -> Result<SourceDescriptor, String> {
    let (mime_type, src) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <type>=<url>, got '{value}'"))?;
    Ok(SourceDescriptor::new(mime_type.trim(), src.trim()))
}

fn init_tracing(verbose: bool, log_format: &str) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, &cli.log_format);
    mpegdash_engine::init();

    match cli.command {
        Commands::Pick { sources } => {
            commands::pick(&sources, &cli.format)?;
        }
        Commands::CanPlay { mime_type } => {
            commands::can_play(&mime_type, &cli.format)?;
        }
        Commands::Replay { scenario, config, autoplay } => {
            commands::replay(&scenario, config.as_deref(), autoplay, &cli.format).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        let source = parse_source("application/dash+xml=https://cdn.example.com/a.mpd?x=1").unwrap();
        assert_eq!(source.mime_type, "application/dash+xml");
        assert_eq!(source.src, "https://cdn.example.com/a.mpd?x=1");
        assert!(parse_source("no-separator").is_err());
    }

    #[test]
    fn test_cli_parses_replay() {
        let cli = Cli::try_parse_from(["mpegdash-cli", "replay", "seek.json", "--autoplay"]).unwrap();
        assert!(matches!(cli.command, Commands::Replay { autoplay: true, .. }));
    }
}
