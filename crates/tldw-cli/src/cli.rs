//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tldw", version, about = "Watch the condensed version of a video")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire a media reference and save the bytes
    Fetch {
        /// Direct media URL or video-sharing link
        reference: String,

        /// Directory to write the file into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Acquire a media reference and find skippable segments
    Analyze {
        /// Direct media URL or video-sharing link
        reference: String,

        /// Write the analysis JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay an analysis file against a simulated clock
    Simulate {
        /// Analysis JSON produced by `analyze`
        analysis: PathBuf,

        /// Media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Viewer seconds between clock advances
        #[arg(short, long, default_value_t = 0.25)]
        step: f64,

        /// Skip and speed up instead of skipping only
        #[arg(long)]
        turbo: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_defaults() {
        let cli = Cli::try_parse_from(["tldw", "fetch", "https://youtu.be/abc123"]).unwrap();
        match cli.command {
            Command::Fetch { reference, output } => {
                assert_eq!(reference, "https://youtu.be/abc123");
                assert_eq!(output, PathBuf::from("."));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "tldw",
            "simulate",
            "analysis.json",
            "--duration",
            "600",
            "--turbo",
        ])
        .unwrap();
        match cli.command {
            Command::Simulate {
                duration,
                step,
                turbo,
                ..
            } => {
                assert_eq!(duration, 600.0);
                assert_eq!(step, 0.25);
                assert!(turbo);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_simulate_requires_duration() {
        assert!(Cli::try_parse_from(["tldw", "simulate", "analysis.json"]).is_err());
    }
}
