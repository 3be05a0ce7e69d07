//! CLI argument definitions for casquery.

use std::path::PathBuf;

use casquery_batch::DEFAULT_COLUMN;
use casquery_model::Normalizer;
use casquery_output::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "casquery",
    version,
    about = "Normalize CAS Registry Numbers and look them up in the EPA Substance Registry Service",
    long_about = "Normalize CAS Registry Numbers and look them up in the EPA Substance \
                  Registry Service (SRS).\n\n\
                  Numbers may be given with or without hyphens; check digits are \
                  verified unless --skip-check-digit is set."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Registry connection settings; flags override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// TOML file with registry settings.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the SRS REST API.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Retries after a network failure or server error.
    #[arg(long = "retries", value_name = "N", global = true)]
    pub retries: Option<u32>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Look up one or more CAS RNs in the registry.
    Search(SearchArgs),

    /// Print the canonical form of each input.
    Normalize(NormalizeArgs),

    /// Report the current CAS RN for a possibly superseded one.
    Resolve(ResolveArgs),

    /// Normalize and resolve a CSV column, writing an annotated copy.
    Batch(BatchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// CAS RNs to look up, with or without hyphens.
    #[arg(value_name = "CASRN", required = true)]
    pub casrns: Vec<String>,

    /// Include synonyms (one extra registry request per record).
    #[arg(short = 's', long = "synonyms")]
    pub synonyms: bool,

    /// Output format.
    #[arg(short = 'F', long = "format", value_enum, default_value = "table")]
    pub format: FormatArg,

    /// Write the rendered output to a file instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub check: CheckDigitArgs,
}

impl SearchArgs {
    /// Whether a spinner runs while the registry is queried: table output
    /// for more than one number.
    #[must_use]
    pub fn shows_progress(&self) -> bool {
        self.casrns.len() > 1 && matches!(self.format, FormatArg::Table)
    }
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// Raw CAS RN text.
    #[arg(value_name = "RAW", required = true)]
    pub inputs: Vec<String>,

    #[command(flatten)]
    pub check: CheckDigitArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// CAS RN to resolve.
    #[arg(value_name = "CASRN")]
    pub casrn: String,

    #[command(flatten)]
    pub check: CheckDigitArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Name of the column holding CAS RNs.
    #[arg(short = 'c', long = "column", default_value = DEFAULT_COLUMN)]
    pub column: String,

    /// Annotated output CSV file.
    #[arg(short = 'o', long = "output", default_value = "casquery_batch.csv")]
    pub output: PathBuf,

    /// Query the registry for every row, even repeated numbers.
    #[arg(long = "no-dedupe")]
    pub no_dedupe: bool,

    #[command(flatten)]
    pub check: CheckDigitArgs,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct CheckDigitArgs {
    /// Accept numbers whose check digit does not match.
    #[arg(long = "skip-check-digit")]
    pub skip_check_digit: bool,
}

impl CheckDigitArgs {
    #[must_use]
    pub fn normalizer(self) -> Normalizer {
        if self.skip_check_digit {
            Normalizer::structural()
        } else {
            Normalizer::strict()
        }
    }
}

/// CLI output format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Table,
    Json,
    Xml,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => Self::Table,
            FormatArg::Json => Self::Json,
            FormatArg::Xml => Self::Xml,
            FormatArg::Csv => Self::Csv,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
