//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::MessageFormat;
use std::path::PathBuf;

/// Training Import - load transcript extracts and report every rejected row
#[derive(Parser, Debug)]
#[command(
    name = "training-import",
    author,
    version,
    about = "Import tab-delimited training transcripts",
    long_about = "Reads a tab-delimited training transcript extract, validates every row \n\
                  and reports problems to the console and, optionally, to a shared log \n\
                  file guarded by a cross-process lock."
)]
pub struct Cli {
    /// Increase diagnostic verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TRAINING_IMPORT_VERBOSE")]
    pub verbose: u8,

    /// Only report diagnostic errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Diagnostic log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "TRAINING_IMPORT_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Expose Prometheus metrics on this local port
    #[arg(long, global = true, env = "TRAINING_IMPORT_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a transcript extract
    Import(ImportArgs),

    /// Validate configuration file without importing
    Validate(ValidateArgs),

    /// Show the header and preamble of an extract
    Info(InfoArgs),
}

/// Arguments for the `import` command
#[derive(Parser, Debug, Clone)]
pub struct ImportArgs {
    /// Tab-delimited transcript extract
    #[arg(short, long, env = "TRAINING_IMPORT_INPUT")]
    pub input: PathBuf,

    /// Configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "TRAINING_IMPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write messages to this log file (appended, lock-coordinated)
    #[arg(long, env = "TRAINING_IMPORT_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Override the message template
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Deliver Diagnostic messages too
    #[arg(long, conflicts_with = "silent")]
    pub verbose_messages: bool,

    /// Deliver no messages at all
    #[arg(long)]
    pub silent: bool,

    /// Seconds to wait for the shared log file lock
    #[arg(long, env = "TRAINING_IMPORT_LOCK_TIMEOUT")]
    pub lock_timeout: Option<u64>,

    /// Override the shared lock file
    #[arg(long, env = "TRAINING_IMPORT_LOCK_PATH")]
    pub lock_path: Option<PathBuf>,

    /// Exit with an error when any row was rejected
    #[arg(long)]
    pub fail_on_errors: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "training-import.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Transcript extract to inspect
    #[arg(short, long)]
    pub input: PathBuf,

    /// Header pattern (regex) to look for
    #[arg(long, default_value = contracts::DEFAULT_HEADER_PATTERN)]
    pub header_pattern: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

/// Message template selectable on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// Text only
    Plain,
    /// Severity label and text
    Severity,
    /// Time, label and text
    Time,
    /// Date, label and text
    Date,
    /// Date and time, label and text
    DateTime,
}

impl From<FormatArg> for MessageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Plain => MessageFormat::Plain,
            FormatArg::Severity => MessageFormat::WithSeverityPrefix,
            FormatArg::Time => MessageFormat::TimePrefixed,
            FormatArg::Date => MessageFormat::DatePrefixed,
            FormatArg::DateTime => MessageFormat::DateTimePrefixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_args_parse() {
        let cli = Cli::try_parse_from([
            "training-import",
            "-v",
            "import",
            "--input",
            "extract.txt",
            "--format",
            "date-time",
            "--verbose-messages",
            "--lock-timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Import(args) => {
                assert_eq!(args.input, PathBuf::from("extract.txt"));
                assert_eq!(args.format, Some(FormatArg::DateTime));
                assert!(args.verbose_messages);
                assert_eq!(args.lock_timeout, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_silent_conflicts_with_verbose_messages() {
        let result = Cli::try_parse_from([
            "training-import",
            "import",
            "--input",
            "x",
            "--silent",
            "--verbose-messages",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_mapping() {
        assert_eq!(
            MessageFormat::from(FormatArg::Severity),
            MessageFormat::WithSeverityPrefix
        );
        assert_eq!(MessageFormat::from(FormatArg::Plain), MessageFormat::Plain);
    }
}
