//! Markdown rendering and print-ready document assembly.
use std::{
  fmt::{self, Write},
  fs,
  path::Path,
  str::FromStr,
};

use comrak::{Options, markdown_to_html};
use html_escape::{encode_double_quoted_attribute, encode_text};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::{
  error::{AnalysisError, Result},
  frontmatter::{FrontMatter, string_field},
  structure::{StructureOptions, annotate},
  types::AnnotatedDocument,
};

/// Build comrak options for document rendering.
///
/// Heading ids are left to the structure pass.
fn comrak_options() -> Options<'static> {
  let mut options = Options::default();
  options.extension.table = true;
  options.extension.footnotes = true;
  options.extension.strikethrough = true;
  options.extension.tasklist = true;
  options.extension.autolink = true;
  options.render.r#unsafe = true;
  options.extension.header_ids = None;
  options
}

/// Render Markdown to an HTML fragment.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
  markdown_to_html(markdown, &comrak_options())
}

/// A rendered and annotated document with its metadata.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
  /// Parsed front matter, empty when absent or unparsable.
  pub metadata:  Mapping,
  /// Annotated body markup.
  pub annotated: AnnotatedDocument,
}

impl RenderedDocument {
  /// Pick the document title: front matter `title`, then the first level-1
  /// heading.
  #[must_use]
  pub fn title(&self) -> Option<&str> {
    string_field(&self.metadata, "title").or(self.annotated.title.as_deref())
  }

  /// Front matter `author`, if any.
  #[must_use]
  pub fn author(&self) -> Option<&str> {
    string_field(&self.metadata, "author")
  }
}

/// Read a Markdown document from disk.
///
/// # Errors
///
/// Returns [`AnalysisError::Read`] if the file cannot be read or is not valid
/// UTF-8.
pub fn read_markdown(path: &Path) -> Result<String> {
  fs::read_to_string(path).map_err(|source| {
    AnalysisError::Read {
      path: path.to_path_buf(),
      source,
    }
  })
}

/// Split front matter, render the body and run the structure pass.
///
/// Unparsable front matter is logged and ignored; rendering never fails.
#[must_use]
pub fn render_document(source: &str, options: &StructureOptions) -> RenderedDocument {
  let (metadata, body) = match FrontMatter::extract(source) {
    Some(front) => {
      let metadata = front.parse().unwrap_or_else(|e| {
        warn!("Ignoring invalid front matter: {e}");
        Mapping::new()
      });
      (metadata, front.body.trim_start_matches('\n'))
    },
    None => (Mapping::new(), source),
  };

  let html = render_markdown(body);
  RenderedDocument {
    metadata,
    annotated: annotate(&html, options),
  }
}

/// Color scheme of the built-in stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Light,
  Dark,
  /// Light, switching to dark when the reader's system prefers it.
  Auto,
}

impl Theme {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Light => "light",
      Self::Dark => "dark",
      Self::Auto => "auto",
    }
  }

  /// Value of the `color-scheme` meta tag.
  const fn color_scheme(self) -> &'static str {
    match self {
      Self::Light => "light",
      Self::Dark => "dark",
      Self::Auto => "light dark",
    }
  }
}

impl fmt::Display for Theme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Theme {
  type Err = AnalysisError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "light" => Ok(Self::Light),
      "dark" => Ok(Self::Dark),
      "auto" => Ok(Self::Auto),
      _ => Err(AnalysisError::UnknownTheme(s.to_string())),
    }
  }
}

/// Settings for the stylesheet embedded when no external one is linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
  pub theme:       Theme,
  pub font_family: String,
  /// Page margin, as a CSS length.
  pub margins:     String,
  /// Printed page size, as accepted by `@page { size }`.
  pub page_size:   String,
}

impl Default for StyleSettings {
  fn default() -> Self {
    Self {
      theme:       Theme::Light,
      font_family: "Segoe UI, Tahoma, Geneva, Verdana, sans-serif".to_string(),
      margins:     "2cm".to_string(),
      page_size:   "A4".to_string(),
    }
  }
}

struct Palette {
  background: &'static str,
  text:       &'static str,
  heading:    &'static str,
  accent:     &'static str,
  muted:      &'static str,
  rule:       &'static str,
  surface:    &'static str,
  border:     &'static str,
  stripe:     &'static str,
}

const LIGHT: Palette = Palette {
  background: "#ffffff",
  text:       "#333333",
  heading:    "#2c3e50",
  accent:     "#3498db",
  muted:      "#666666",
  rule:       "#ecf0f1",
  surface:    "#f8f9fa",
  border:     "#dddddd",
  stripe:     "#f9f9f9",
};

const DARK: Palette = Palette {
  background: "#1e1f22",
  text:       "#d4d4d4",
  heading:    "#e8eaed",
  accent:     "#5dade2",
  muted:      "#a0a0a0",
  rule:       "#3a3d41",
  surface:    "#2b2d31",
  border:     "#44474c",
  stripe:     "#25272b",
};

fn write_palette(out: &mut String, palette: &Palette) {
  let _ = write!(
    out,
    ":root {{ --bg: {}; --fg: {}; --heading: {}; --accent: {}; --muted: {}; \
     --rule: {}; --surface: {}; --border: {}; --stripe: {}; }}",
    palette.background,
    palette.text,
    palette.heading,
    palette.accent,
    palette.muted,
    palette.rule,
    palette.surface,
    palette.border,
    palette.stripe,
  );
}

/// Drop characters that could end a declaration or the `<style>` element.
fn css_value(value: &str) -> String {
  value
    .chars()
    .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';'))
    .collect()
}

/// Element rules shared by every theme. Colors come from the palette
/// variables.
const BASE_RULES: &str = include_str!("../templates/default.css");

/// Render the built-in stylesheet for `style`.
#[must_use]
pub fn default_stylesheet(style: &StyleSettings) -> String {
  let mut css = String::with_capacity(BASE_RULES.len() + 1024);
  match style.theme {
    Theme::Light => write_palette(&mut css, &LIGHT),
    Theme::Dark => write_palette(&mut css, &DARK),
    Theme::Auto => {
      write_palette(&mut css, &LIGHT);
      css.push_str("\n@media (prefers-color-scheme: dark) {\n");
      write_palette(&mut css, &DARK);
      css.push_str("\n}");
    },
  }
  let _ = write!(
    css,
    "\nbody {{ font-family: {}; line-height: 1.6; margin: {}; color: var(--fg); \
     background-color: var(--bg); }}\n",
    css_value(&style.font_family),
    css_value(&style.margins),
  );
  css.push_str(BASE_RULES);
  let _ = writeln!(
    css,
    "@page {{ margin: {}; size: {}; @bottom-center {{ content: counter(page); \
     font-size: 0.8em; }} }}",
    css_value(&style.margins),
    css_value(&style.page_size),
  );
  css
}

/// Page-level settings for a standalone HTML document.
#[derive(Debug, Clone, Copy)]
pub struct PageSettings<'a> {
  pub title:      &'a str,
  pub language:   &'a str,
  pub author:     Option<&'a str>,
  /// External stylesheet href. When `None`, the built-in stylesheet for
  /// `style` is embedded instead.
  pub stylesheet: Option<&'a str>,
  pub style:      &'a StyleSettings,
}

/// Wrap body markup into a standalone HTML document.
#[must_use]
pub fn html_document(body: &str, page: &PageSettings<'_>) -> String {
  let mut out = String::with_capacity(body.len() + 4096);
  // Writing to String is infallible
  let _ = write!(
    out,
    "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n",
    encode_double_quoted_attribute(page.language)
  );
  let _ = writeln!(out, "<title>{}</title>", encode_text(page.title));
  if let Some(author) = page.author {
    let _ = writeln!(
      out,
      "<meta name=\"author\" content=\"{}\">",
      encode_double_quoted_attribute(author)
    );
  }
  if let Some(stylesheet) = page.stylesheet {
    let _ = writeln!(
      out,
      "<link rel=\"stylesheet\" href=\"{}\">",
      encode_double_quoted_attribute(stylesheet)
    );
  } else {
    let _ = writeln!(
      out,
      "<meta name=\"color-scheme\" content=\"{}\">",
      page.style.theme.color_scheme()
    );
    let _ = write!(out, "<style>\n{}</style>\n", default_stylesheet(page.style));
  }
  out.push_str("</head>\n<body>\n<main class=\"document\">\n");
  out.push_str(body);
  out.push_str("\n</main>\n</body>\n</html>\n");
  out
}
