use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shortify")]
#[command(author, version, about = "Turn a video file or link into a 30 second 720p clip")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "SHORTIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a short clip from a file or a link
    Generate(GenerateArgs),

    /// Check that the transcoding engine can start
    CheckEngine,

    /// Print the effective configuration
    ShowConfig {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Local video file; used instead of --url when both are given
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Direct link to a video file
    #[arg(short, long)]
    pub url: Option<String>,

    /// Where to save the clip
    #[arg(short, long, default_value = "short.mp4")]
    pub output: PathBuf,

    /// Print metrics after the job
    #[arg(long)]
    pub metrics: bool,

    /// Print UI events as JSON lines instead of a progress line
    #[arg(long)]
    pub json_events: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from([
            "shortify",
            "generate",
            "--url",
            "https://host/clip.mp4",
            "-o",
            "out.mp4",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.url.as_deref(), Some("https://host/clip.mp4"));
                assert!(args.file.is_none());
                assert_eq!(args.output, PathBuf::from("out.mp4"));
                assert!(!args.metrics);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_allows_empty_selection() {
        // The orchestrator answers an empty selection with its own notice
        let cli = Cli::parse_from(["shortify", "generate"]);
        match cli.command {
            Commands::Generate(args) => {
                assert!(args.file.is_none() && args.url.is_none());
                assert_eq!(args.output, PathBuf::from("short.mp4"));
            }
            _ => panic!("expected generate"),
        }
    }
}
