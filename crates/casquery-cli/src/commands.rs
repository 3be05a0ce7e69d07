//! Subcommand implementations.
//!
//! Each command takes its registry as a parameter so the binary can pass the
//! HTTP client while tests pass an in-memory one.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use casquery_batch::{BatchPipeline, BatchRow, BatchSummary, PipelineOptions, run_batch};
use casquery_model::{Casrn, Normalizer};
use casquery_output::{OutputFormat, render};
use casquery_registry::{Registry, RegistryConfig, Resolver};
use tracing::{debug, info};

use crate::cli::{BatchArgs, NormalizeArgs, RegistryArgs, ResolveArgs, SearchArgs};

/// Build the registry configuration from an optional file plus flag
/// overrides.
pub fn registry_config(args: &RegistryArgs) -> Result<RegistryConfig> {
    let mut config = match &args.config {
        Some(path) => RegistryConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RegistryConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.trim_end_matches('/'));
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout_secs(timeout);
    }
    if let Some(retries) = args.retries {
        config = config.with_max_retries(retries);
    }
    config.validate().context("invalid registry settings")?;
    debug!(
        base_url = %config.base_url,
        timeout_secs = config.timeout_secs,
        max_retries = config.max_retries,
        "registry configuration"
    );
    Ok(config)
}

/// Normalize every input, failing on the first one that is not a CAS RN.
pub fn normalize_all(inputs: &[String], normalizer: Normalizer) -> Result<Vec<Casrn>> {
    inputs
        .iter()
        .map(|raw| {
            normalizer
                .normalize(raw)
                .with_context(|| format!("cannot search for '{raw}'"))
        })
        .collect()
}

/// Look up the requested numbers and render the results.
pub fn run_search<R: Registry>(args: &SearchArgs, registry: &R) -> Result<String> {
    let casrns = normalize_all(&args.casrns, args.check.normalizer())?;
    let mut results = registry
        .search(&casrns, args.synonyms)
        .context("registry search failed")?;
    results.sort_by(|a, b| a.cas_rn.cmp(&b.cas_rn));
    info!(queried = casrns.len(), records = results.len(), "search complete");

    let format = OutputFormat::from(args.format);
    let rendered = render(&results, format).with_context(|| format!("failed to render {format}"))?;
    Ok(rendered)
}

/// Write `text` to `path`, or to `out` when no path is given.
pub fn emit(text: &str, path: Option<&Path>, out: &mut impl Write) -> Result<()> {
    match path {
        Some(path) => {
            let mut contents = text.to_string();
            if !contents.ends_with('\n') {
                contents.push('\n');
            }
            fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => writeln!(out, "{text}").context("failed to write output")?,
    }
    Ok(())
}

/// Print `raw -> canonical` for each input.
///
/// Every input is attempted; the command fails afterwards if any of them
/// could not be normalized.
pub fn run_normalize(args: &NormalizeArgs, out: &mut impl Write) -> Result<()> {
    let normalizer = args.check.normalizer();
    let mut failed = 0usize;
    for raw in &args.inputs {
        match normalizer.normalize(raw) {
            Ok(casrn) => writeln!(out, "{raw} -> {casrn}")?,
            Err(error) => {
                failed += 1;
                writeln!(out, "{raw} -> error [{}]: {error}", error.kind())?;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} inputs could not be normalized", args.inputs.len());
    }
    Ok(())
}

/// Print the current CAS RN for the given one.
pub fn run_resolve<R: Registry>(
    args: &ResolveArgs,
    registry: &R,
    out: &mut impl Write,
) -> Result<()> {
    let casrn = args
        .check
        .normalizer()
        .normalize(&args.casrn)
        .with_context(|| format!("cannot resolve '{}'", args.casrn))?;
    let resolution = Resolver::new(registry)
        .resolve(&casrn)
        .with_context(|| format!("failed to resolve {casrn}"))?;

    let name = resolution
        .record
        .epa_name
        .as_deref()
        .or(resolution.record.systematic_name.as_deref());
    let suffix = name.map(|name| format!(" ({name})")).unwrap_or_default();
    if resolution.is_superseded() {
        writeln!(
            out,
            "{} has been superseded by {}{suffix}",
            resolution.query, resolution.current
        )?;
    } else {
        writeln!(out, "{} is current{suffix}", resolution.current)?;
    }
    Ok(())
}

/// Run a batch file through the pipeline.
pub fn run_batch_file<R, F>(args: &BatchArgs, registry: R, on_row: F) -> Result<BatchSummary>
where
    R: Registry,
    F: FnMut(&BatchRow),
{
    let options = PipelineOptions::default()
        .with_normalizer(args.check.normalizer())
        .with_dedupe(!args.no_dedupe);
    let pipeline = BatchPipeline::new(registry, options);
    let summary = run_batch(&pipeline, &args.input, &args.column, &args.output, on_row)
        .with_context(|| format!("batch run over {} failed", args.input.display()))?;
    Ok(summary)
}
