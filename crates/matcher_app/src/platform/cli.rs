use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use super::config::DEFAULT_CONFIG_FILENAME;

#[derive(Debug, Parser)]
#[command(name = "matcher")]
#[command(about = "Terminal client for the research matching service")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Backend base URL, overrides the config file
    #[arg(long)]
    pub api_url: Option<String>,

    /// Verbosity level
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Tabbed interactive session (default)
    Interactive,

    /// Find researchers matching a profile description
    Search {
        /// Research interests, free text
        #[arg(required = true, num_args = 1..)]
        profile: Vec<String>,

        /// Maximum number of papers to consider
        #[arg(short, long)]
        limit: Option<u32>,

        /// Minimum similarity in percent (0-100)
        #[arg(short, long)]
        score: Option<u8>,
    },

    /// Queue ingestion of a university faculty directory
    Ingest {
        /// University name
        university: String,

        /// Faculty directory URL
        dept_url: String,

        /// Keep polling until the job finishes
        #[arg(short, long)]
        follow: bool,
    },

    /// Follow the progress of an existing ingestion job
    Watch {
        /// Job id returned by ingest
        job_id: String,
    },

    /// Check that the backend is reachable
    Health,

    /// Download the professor spreadsheet
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Command::Interactive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["matcher"]).unwrap();
        assert!(cli.is_interactive());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILENAME));
    }

    #[test]
    fn search_joins_profile_words() {
        let cli =
            Cli::try_parse_from(["matcher", "-vv", "search", "deep", "learning", "-l", "80"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Search {
                profile,
                limit,
                score,
            }) => {
                assert_eq!(profile.join(" "), "deep learning");
                assert_eq!(limit, Some(80));
                assert_eq!(score, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn ingest_requires_url() {
        assert!(Cli::try_parse_from(["matcher", "ingest", "Example U"]).is_err());
        let cli = Cli::try_parse_from([
            "matcher",
            "ingest",
            "Example U",
            "https://example.edu/people",
            "--follow",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Ingest { follow: true, .. })));
    }
}
