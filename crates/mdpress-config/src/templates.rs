//! Default configuration file contents written by `mdpress init`.
use crate::{config::Config, error::ConfigError};

/// Commented TOML configuration matching [`Config::default`].
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# mdpress configuration

# Directory containing the Markdown sources.
# input_dir = "docs"

# Where converted documents are written.
output_dir = "output"

# Worker threads for batch operations. Defaults to the number of CPUs.
# jobs = 4

# Document title used when a file has no front matter title or H1.
# title = "My Documents"

# Value of the <html lang> attribute.
language = "en"

# Stylesheet copied next to the output and linked from every page. When
# unset, the built-in stylesheet configured under [style] is embedded.
# stylesheet = "style/print.css"

[style]
# Built-in stylesheet color scheme: "light", "dark" or "auto" (follows the
# reader's system preference).
theme = "light"
font_family = "Segoe UI, Tahoma, Geneva, Verdana, sans-serif"
margins = "2cm"
page_size = "A4"

[metadata]
# Author for the <meta name="author"> tag when front matter has none.
# default_author = "Docs Team"
# Title used after front matter, the first H1 and `title` above.
# default_title = "Untitled Document"

[toc]
# Insert a table of contents when a document has two or more headings.
enable = true
# Deepest heading level listed in the TOC and numbered.
max_depth = 3
# Prefix headings with hierarchical numbers such as 1.2.1.
numbering = false
title = "Table of Contents"

[validation]
check_broken_links = true
check_missing_images = true
check_empty_files = true
max_file_size_mb = 10
max_line_length = 120
max_emojis = 20
allowed_non_ascii = "áéíóúñüÁÉÍÓÚÑÜ"

# Named templates, selected with `mdpress convert --template <name>` and
# listed by `mdpress templates`. "report", "presentation" and "dark" are
# built in; a template defined here with the same name replaces it. Every
# field is optional: stylesheet, language, theme, font_family, margins,
# page_size, numbering and description.
#
# [templates.handbook]
# description = "Printed handbook"
# font_family = "Georgia, serif"
# margins = "3cm"
# numbering = true
"#;

/// Default configuration file contents for `format`.
///
/// # Errors
///
/// Returns an error for formats other than `toml` and `json`.
pub fn default_config(format: &str) -> Result<String, ConfigError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE.to_string()),
    "json" => Ok(serde_json::to_string_pretty(&Config::default())?),
    other => {
      Err(ConfigError::Config(format!(
        "Unsupported config format: '{other}'. Expected toml or json"
      )))
    },
  }
}
