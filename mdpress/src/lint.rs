//! Validation runs and report printing.
use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Result, bail};
use log::info;
use mdpress_analysis::{
  Summary,
  ValidationResult,
  Validator,
  render_json_report,
  render_text_report,
};
use mdpress_config::Config;

/// Validate a single file or every Markdown file under a directory.
///
/// A path that does not exist is validated as a file and reported as not
/// found.
#[must_use]
pub fn validate_input(
  config: &Config,
  input: &Path,
) -> BTreeMap<PathBuf, ValidationResult> {
  let validator = Validator::on_disk(config.validation_options());
  if input.is_dir() {
    validator.validate_directory(input)
  } else {
    validator.validate_batch(&[input.to_path_buf()])
  }
}

/// Render results in the requested format, `text` or `json`.
///
/// # Errors
///
/// Returns an error for an unknown format or if JSON serialization fails.
pub fn render_report(
  results: &BTreeMap<PathBuf, ValidationResult>,
  format: &str,
  details: bool,
) -> Result<String> {
  match format {
    "text" => Ok(render_text_report(results, details)),
    "json" => Ok(render_json_report(results)?),
    other => bail!("Unsupported report format: {other}"),
  }
}

/// Log a one-line verdict for a finished run and return the summary.
#[must_use]
pub fn log_verdict(results: &BTreeMap<PathBuf, ValidationResult>) -> Summary {
  let summary = Summary::from_results(results.values());
  if summary.invalid_files > 0 {
    info!(
      "{} of {} files have errors",
      summary.invalid_files, summary.total_files
    );
  } else if summary.total_issues > 0 {
    info!(
      "All {} files are valid, with {} warnings and suggestions",
      summary.total_files, summary.total_issues
    );
  } else {
    info!("All {} files are clean", summary.total_files);
  }
  summary
}
