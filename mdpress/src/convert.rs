//! Markdown to standalone HTML conversion.
use std::{
  fmt::Write,
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use log::{debug, info, warn};
use mdpress_analysis::{
  PageSettings,
  collect_markdown_files,
  html_document,
  read_markdown,
  render_document,
};
use mdpress_config::Config;
use rayon::prelude::*;

/// Outcome of converting a batch of documents, in input order.
#[derive(Debug, Default)]
pub struct ConversionReport {
  /// Pages written, as output paths.
  pub converted: Vec<PathBuf>,
  /// Inputs skipped because they were blank.
  pub skipped:   Vec<PathBuf>,
  /// Inputs that failed, with the error message.
  pub failed:    Vec<(PathBuf, String)>,
}

impl ConversionReport {
  #[must_use]
  pub fn total(&self) -> usize {
    self.converted.len() + self.skipped.len() + self.failed.len()
  }

  #[must_use]
  pub fn is_success(&self) -> bool {
    self.failed.is_empty()
  }
}

enum Outcome {
  Converted(PathBuf),
  Skipped,
  Failed(String),
}

/// Resolve an input path into the root that output paths are relative to
/// and the documents to convert.
///
/// # Errors
///
/// Returns an error if `input` does not exist.
pub fn resolve_inputs(input: &Path) -> Result<(PathBuf, Vec<PathBuf>)> {
  if input.is_file() {
    let root = input.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((root, vec![input.to_path_buf()]))
  } else if input.is_dir() {
    Ok((input.to_path_buf(), collect_markdown_files(input)))
  } else {
    bail!("Input path does not exist: {}", input.display())
  }
}

/// Relative prefix leading from a page back to the output root. For example
/// "guide/setup.html" gives "../".
#[must_use]
pub fn root_relative_prefix(rel_path: &Path) -> String {
  let depth = rel_path.components().count();
  if depth <= 1 {
    String::new()
  } else {
    "../".repeat(depth - 1)
  }
}

/// Convert every document under `input` into `config.output_dir`, mirroring
/// the input layout with `.html` extensions.
///
/// Per-document failures are collected in the report rather than aborting
/// the batch.
///
/// # Errors
///
/// Returns an error if the input does not exist, the output directory cannot
/// be created or the stylesheet cannot be copied.
pub fn convert_documents(config: &Config, input: &Path) -> Result<ConversionReport> {
  let (root, files) = resolve_inputs(input)?;
  info!("Found {} markdown files", files.len());

  fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
    format!(
      "Failed to create output directory: {}",
      config.output_dir.display()
    )
  })?;

  let stylesheet = config
    .stylesheet
    .as_deref()
    .map(|path| copy_stylesheet(path, &config.output_dir))
    .transpose()?;

  let outcomes: Vec<(PathBuf, Outcome)> = files
    .par_iter()
    .map(|file| {
      let outcome = match convert_file(config, &root, file, stylesheet.as_deref()) {
        Ok(Some(output)) => Outcome::Converted(output),
        Ok(None) => Outcome::Skipped,
        Err(e) => Outcome::Failed(format!("{e:#}")),
      };
      (file.clone(), outcome)
    })
    .collect();

  let mut report = ConversionReport::default();
  for (file, outcome) in outcomes {
    match outcome {
      Outcome::Converted(output) => report.converted.push(output),
      Outcome::Skipped => report.skipped.push(file),
      Outcome::Failed(message) => report.failed.push((file, message)),
    }
  }
  Ok(report)
}

/// Convert a single document. Returns `None` when the document is blank.
///
/// # Errors
///
/// Returns an error if the document cannot be read or the page cannot be
/// written.
pub fn convert_file(
  config: &Config,
  root: &Path,
  file: &Path,
  stylesheet: Option<&str>,
) -> Result<Option<PathBuf>> {
  let content = read_markdown(file)?;

  if content.trim().is_empty() {
    warn!("Skipping empty file: {}", file.display());
    return Ok(None);
  }

  let rendered = render_document(&content, &config.structure_options());

  let rel_path = file.strip_prefix(root).map_or_else(
    |_| PathBuf::from(file.file_name().unwrap_or_default()),
    Path::to_path_buf,
  );
  let stem = file
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default();
  let title = rendered
    .title()
    .or(config.title.as_deref())
    .or(config.metadata.default_title.as_deref())
    .unwrap_or(&stem);
  let author = rendered
    .author()
    .or(config.metadata.default_author.as_deref());
  let stylesheet_href =
    stylesheet.map(|name| format!("{}{name}", root_relative_prefix(&rel_path)));

  let page = html_document(&rendered.annotated.html, &PageSettings {
    title,
    language: &config.language,
    author,
    stylesheet: stylesheet_href.as_deref(),
    style: &config.style,
  });

  let output = config.output_dir.join(&rel_path).with_extension("html");
  if let Some(parent) = output.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
  }
  fs::write(&output, page)
    .wrap_err_with(|| format!("Failed to write page: {}", output.display()))?;

  debug!(
    "Converted {} -> {} ({} headings)",
    file.display(),
    output.display(),
    rendered.annotated.headings.len()
  );
  Ok(Some(output))
}

/// One line per available template: name, then its description.
#[must_use]
pub fn describe_templates(config: &Config) -> String {
  let templates = config.available_templates();
  let width = templates.keys().map(String::len).max().unwrap_or_default();
  let mut out = String::from("Available templates:\n");
  for (name, template) in &templates {
    let description = template.description.as_deref().unwrap_or_default();
    let _ = writeln!(out, "  {name:<width$}  {description}");
  }
  out.push_str("Use `mdpress convert --template <name>` to select one.");
  out
}

/// Copy the stylesheet into the output root and return its file name.
fn copy_stylesheet(path: &Path, output_dir: &Path) -> Result<String> {
  let Some(name) = path.file_name() else {
    bail!("Stylesheet path has no file name: {}", path.display());
  };
  fs::copy(path, output_dir.join(name)).wrap_err_with(|| {
    format!("Failed to copy stylesheet: {}", path.display())
  })?;
  Ok(name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_root_relative_prefix() {
    assert_eq!(root_relative_prefix(Path::new("index.html")), "");
    assert_eq!(root_relative_prefix(Path::new("guide/setup.html")), "../");
    assert_eq!(root_relative_prefix(Path::new("a/b/c.html")), "../../");
  }

  #[test]
  fn test_describe_templates() {
    let listing = describe_templates(&Config::default());
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines[0], "Available templates:");
    assert!(lines[1].starts_with("  dark          Default layout"));
    assert!(lines[2].starts_with("  presentation  "));
    assert!(lines[3].starts_with("  report        Serif report"));
    assert_eq!(lines.len(), 5);
  }

  #[test]
  fn test_missing_input_is_an_error() {
    assert!(resolve_inputs(Path::new("/nonexistent/mdpress/input")).is_err());
  }
}
