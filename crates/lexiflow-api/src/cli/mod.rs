//! CLI command definitions for the `lexiflow` binary.
//!
//! Uses clap derive macros for argument parsing. Commands operate on the
//! same SQLite run store the server uses, so runs survive between
//! invocations.

pub mod analyze;
pub mod runs;
pub mod workflow;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

/// Generate reviewed learning content from reading texts.
#[derive(Parser)]
#[command(name = "lexiflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Data directory (database and config.toml).
    #[arg(long, global = true, env = "LEXIFLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log level for the verbosity flags; `RUST_LOG` still wins.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Trigger a workflow run and drive it until it suspends or finishes.
    #[command(group(ArgGroup::new("source").required(true).args(["text", "file"])))]
    Trigger {
        /// Workflow name (see `lexiflow workflows`).
        workflow: String,

        /// Reading text to generate from.
        #[arg(long)]
        text: Option<String>,

        /// Read the reading text from a file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Target CEFR level (A1..C2).
        #[arg(long, default_value = "A2")]
        level: String,

        /// Target language code (es, en, fr, de, it, pt, la).
        #[arg(long)]
        language: String,

        /// Maximum items per generated section.
        #[arg(long, default_value = "10")]
        max_items: u32,

        /// Source reading ids recorded on every item (repeatable).
        #[arg(long = "source-reading-id")]
        source_reading_ids: Vec<String>,

        /// Owner id stored on the run.
        #[arg(long, default_value = "cli")]
        owner: String,
    },

    /// Show the current state of a run.
    Status {
        /// Run UUID.
        run_id: Uuid,
    },

    /// Approve, reject or cancel a suspended run.
    #[command(group(ArgGroup::new("decision").required(true).args(["approve", "reject", "cancel", "data"])))]
    Resume {
        /// Run UUID.
        run_id: Uuid,

        /// Accept the suspended output as-is.
        #[arg(long)]
        approve: bool,

        /// Regenerate the step, optionally with --feedback.
        #[arg(long)]
        reject: bool,

        /// Fail the run without further generation.
        #[arg(long)]
        cancel: bool,

        /// Reviewer feedback sent with the decision.
        #[arg(long, conflicts_with_all = ["cancel", "data"])]
        feedback: Option<String>,

        /// Raw resumeData JSON.
        #[arg(long)]
        data: Option<String>,
    },

    /// Analyze a text locally: per-token breakdown and ranked candidates.
    #[command(group(ArgGroup::new("source").required(true).args(["text", "file"])))]
    Analyze {
        /// Text to analyze.
        #[arg(long)]
        text: Option<String>,

        /// Read the text from a file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Language code.
        #[arg(long)]
        language: String,

        /// Maximum number of candidates.
        #[arg(long)]
        max_candidates: Option<usize>,

        /// Also list every token.
        #[arg(long)]
        words: bool,
    },

    /// List registered workflows.
    Workflows,

    /// Inspect and maintain stored runs.
    Runs {
        #[command(subcommand)]
        action: runs::RunsCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_trigger_requires_a_source() {
        assert!(Cli::try_parse_from(["lexiflow", "trigger", "vocabulary", "--language", "es"]).is_err());

        let cli = Cli::try_parse_from([
            "lexiflow",
            "trigger",
            "vocabulary",
            "--language",
            "es",
            "--text",
            "La casa es grande.",
            "--source-reading-id",
            "r-1",
            "--source-reading-id",
            "r-2",
        ])
        .unwrap();
        match cli.command {
            Commands::Trigger {
                source_reading_ids,
                max_items,
                ..
            } => {
                assert_eq!(source_reading_ids, vec!["r-1", "r-2"]);
                assert_eq!(max_items, 10);
            }
            _ => panic!("expected trigger"),
        }
    }

    #[test]
    fn test_resume_decision_is_exclusive() {
        let id = Uuid::now_v7().to_string();
        assert!(Cli::try_parse_from(["lexiflow", "resume", &id]).is_err());
        assert!(Cli::try_parse_from(["lexiflow", "resume", &id, "--approve", "--cancel"]).is_err());
        assert!(
            Cli::try_parse_from(["lexiflow", "resume", &id, "--cancel", "--feedback", "x"]).is_err()
        );
        assert!(
            Cli::try_parse_from(["lexiflow", "resume", &id, "--reject", "--feedback", "simpler"])
                .is_ok()
        );
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::try_parse_from(["lexiflow", "-vv", "workflows"]).unwrap();
        assert_eq!(cli.log_level(), "trace");
        let cli = Cli::try_parse_from(["lexiflow", "workflows"]).unwrap();
        assert_eq!(cli.log_level(), "info");
    }
}
