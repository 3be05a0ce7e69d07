//! casquery CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use casquery_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use casquery_cli::commands::{
    emit, registry_config, run_batch_file, run_normalize, run_resolve, run_search,
};
use casquery_cli::logging::{LogConfig, LogFormat, init_logging};
use casquery_cli::summary::print_batch_summary;
use casquery_registry::RegistryClient;
use clap::{ColorChoice, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::level_filters::LevelFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match &cli.command {
        Command::Normalize(args) => run_normalize(args, &mut stdout),
        Command::Search(args) => {
            let client = connect(cli)?;
            let spinner = if args.shows_progress() {
                spinner("{spinner} {msg}")
            } else {
                ProgressBar::hidden()
            };
            spinner.set_message(format!("querying {} numbers", args.casrns.len()));
            let result = run_search(args, &client);
            spinner.finish_and_clear();
            let rendered = result?;
            emit(&rendered, args.output.as_deref(), &mut stdout)
        }
        Command::Resolve(args) => {
            let client = connect(cli)?;
            run_resolve(args, &client, &mut stdout)
        }
        Command::Batch(args) => {
            let client = connect(cli)?;
            let spinner = spinner("{spinner} {pos} rows {msg}");
            let result = run_batch_file(args, &client, |row| {
                spinner.inc(1);
                spinner.set_message(format!("row {} {}", row.row, row.status));
            });
            spinner.finish_and_clear();
            let summary = result?;
            print_batch_summary(&summary, &args.output);
            Ok(())
        }
    }
}

fn connect(cli: &Cli) -> Result<RegistryClient> {
    let config = registry_config(&cli.registry)?;
    RegistryClient::from_config(&config).context("failed to create registry client")
}

/// Spinner on stderr; hidden when stderr is not a terminal.
fn spinner(template: &str) -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template(template) {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
