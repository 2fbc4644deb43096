use std::path::Path;

use quick_xml::{Reader, events::Event};

use super::{Rule, RuleContext};
use crate::validate::{
  issue::{IssueKind, ValidationIssue},
  source::{Reference, SourceDocument},
};

/// Image formats the exporter handles natively.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] =
  ["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// Images above this size slow down export.
pub const LARGE_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// SVG sources above this size are flagged.
pub const LARGE_SVG_BYTES: usize = 100 * 1024;

/// Missing, oversized or unusual images and SVG sanity checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRule;

impl ImageRule {
  fn unsupported(image: &Reference, extension: &str) -> ValidationIssue {
    ValidationIssue::new(
      IssueKind::UnsupportedFormat,
      format!("Unusual image format: {}", image.target),
    )
    .with_line(image.line)
    .with_suggestion("Use a standard format: PNG, JPG, SVG, GIF or WebP")
    .with_context(format!("Extension: {extension}"))
  }

  fn check_svg(
    path: &Path,
    image: &Reference,
    ctx: &RuleContext<'_>,
    issues: &mut Vec<ValidationIssue>,
  ) {
    let name = path
      .file_name()
      .map_or_else(|| image.target.clone(), |n| n.to_string_lossy().into_owned());

    let content = match ctx.fs.read_to_string(path) {
      Ok(content) => content,
      Err(e) => {
        issues.push(
          ValidationIssue::new(
            IssueKind::SvgReadError,
            format!("Failed to read SVG: {name}"),
          )
          .with_line(image.line)
          .with_suggestion(format!("Check that the file is readable: {e}")),
        );
        return;
      },
    };

    match inspect_svg(&content) {
      Err(reason) => {
        issues.push(
          ValidationIssue::new(IssueKind::SvgInvalid, format!("Invalid SVG file: {name}"))
            .with_line(image.line)
            .with_suggestion("Check that the file contains valid SVG markup")
            .with_context(reason),
        );
        return;
      },
      Ok(false) => {
        issues.push(
          ValidationIssue::new(
            IssueKind::SvgNoViewbox,
            format!("SVG without viewBox or dimensions: {name}"),
          )
          .with_line(image.line)
          .with_suggestion("Add a viewBox for correct scaling in the exported document"),
        );
      },
      Ok(true) => {},
    }

    if content.len() > LARGE_SVG_BYTES {
      #[allow(clippy::cast_precision_loss, reason = "Display only")]
      let kib = content.len() as f64 / 1024.0;
      issues.push(
        ValidationIssue::new(
          IssueKind::SvgTooLarge,
          format!("SVG is very large: {name} ({kib:.1}KB)"),
        )
        .with_line(image.line)
        .with_suggestion("Optimize the SVG for better performance"),
      );
    }
  }
}

impl Rule for ImageRule {
  fn name(&self) -> &'static str {
    "images"
  }

  fn check(
    &self,
    doc: &SourceDocument<'_>,
    ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue> {
    let base = doc.base_dir();
    let mut issues = Vec::new();

    for image in &doc.images {
      if image.label.trim().is_empty() {
        issues.push(
          ValidationIssue::new(
            IssueKind::MissingAltText,
            format!("Image without alt text: {}", image.target),
          )
          .with_line(image.line)
          .with_suggestion("Describe the image in the alt text for accessibility"),
        );
      }

      if image.target.starts_with("data:") {
        continue;
      }

      if image.is_external() {
        if image.target.starts_with("http://") || image.target.starts_with("https://") {
          let extension = extension_of(image.local_path());
          if !SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            issues.push(Self::unsupported(image, &extension));
          }
        }
        continue;
      }

      let path = base.join(image.local_path());
      if !ctx.fs.exists(&path) {
        if ctx.options.check_missing_images {
          issues.push(
            ValidationIssue::new(
              IssueKind::MissingImage,
              format!("Image not found: {}", image.target),
            )
            .with_line(image.line)
            .with_suggestion(format!("Check that the file exists at {}", path.display())),
          );
        }
        continue;
      }

      let extension = extension_of(image.local_path());
      if !SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        issues.push(Self::unsupported(image, &extension));
      }

      if extension == "svg" {
        Self::check_svg(&path, image, ctx, &mut issues);
      }

      match ctx.fs.size(&path) {
        Ok(size) if size > LARGE_IMAGE_BYTES => {
          #[allow(clippy::cast_precision_loss, reason = "Display only")]
          let mib = size as f64 / 1024.0 / 1024.0;
          issues.push(
            ValidationIssue::new(
              IssueKind::LargeImage,
              format!("Image is very large: {} ({mib:.1}MB)", image.target),
            )
            .with_line(image.line)
            .with_suggestion("Optimize the image to reduce its size"),
          );
        },
        Ok(_) => {},
        Err(e) => log::warn!("Could not stat image {}: {e}", path.display()),
      }
    }

    issues
  }
}

fn extension_of(path: &str) -> String {
  Path::new(path)
    .extension()
    .map(|ext| ext.to_string_lossy().to_lowercase())
    .unwrap_or_default()
}

/// Parse an SVG document far enough to find its root element.
///
/// Returns whether the root carries a `viewBox` or `width` attribute, or a
/// description of why the document is not a well-formed SVG.
fn inspect_svg(content: &str) -> Result<bool, String> {
  let mut reader = Reader::from_str(content);
  let mut root: Option<bool> = None;

  loop {
    match reader.read_event() {
      Ok(Event::Start(element) | Event::Empty(element)) if root.is_none() => {
        if element.local_name().as_ref() != b"svg" {
          return Err(format!(
            "root element is <{}>, expected <svg>",
            String::from_utf8_lossy(element.name().as_ref())
          ));
        }
        let mut has_dimensions = false;
        for attr in element.attributes() {
          let attr = attr.map_err(|e| e.to_string())?;
          let key = attr.key.local_name();
          if key.as_ref() == b"viewBox" || key.as_ref() == b"width" {
            has_dimensions = true;
          }
        }
        root = Some(has_dimensions);
      },
      Ok(Event::Eof) => break,
      Ok(_) => {},
      Err(e) => {
        return Err(format!(
          "parse error at byte {}: {e}",
          reader.buffer_position()
        ));
      },
    }
  }

  root.ok_or_else(|| "no root element".to_string())
}

#[cfg(test)]
mod tests {
  use super::{
    super::test_support::{codes, run_rule},
    *,
  };
  use crate::validate::{ValidationOptions, fs::MemoryFs};

  const GOOD_SVG: &str =
    r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect/></svg>"#;

  fn check(text: &str, fs: &MemoryFs) -> Vec<ValidationIssue> {
    run_rule(&ImageRule, text, fs, &ValidationOptions::default())
  }

  #[test]
  fn test_missing_image() {
    let issues = check("![chart](img/chart.png)\n", &MemoryFs::new());
    assert_eq!(codes(&issues), vec!["E005"]);
  }

  #[test]
  fn test_missing_image_not_checked() {
    let options = ValidationOptions {
      check_missing_images: false,
      ..Default::default()
    };
    let issues = run_rule(&ImageRule, "![c](c.png)\n", &MemoryFs::new(), &options);
    assert!(issues.is_empty());
  }

  #[test]
  fn test_alt_format_and_size() {
    let fs = MemoryFs::new()
      .with_file("docs/a.bmp", vec![0u8; 8])
      .with_file("docs/big.png", vec![0u8; 5 * 1024 * 1024 + 1]);
    let issues = check("![](a.bmp)\n![big](big.png)\n", &fs);
    assert_eq!(codes(&issues), vec!["E019", "E006", "E016"]);
  }

  #[test]
  fn test_remote_image_extension() {
    let text = "![a](https://cdn.example.org/logo.png?v=3) ![b](https://cdn.example.org/render)\n";
    let issues = check(text, &MemoryFs::new());
    assert_eq!(codes(&issues), vec!["E006"]);
  }

  #[test]
  fn test_valid_svg() {
    let fs = MemoryFs::new().with_file("docs/d.svg", GOOD_SVG);
    assert!(check("![d](d.svg)\n", &fs).is_empty());
  }

  #[test]
  fn test_svg_without_dimensions() {
    let fs = MemoryFs::new().with_file(
      "docs/d.svg",
      r#"<svg xmlns="http://www.w3.org/2000/svg"><g/></svg>"#,
    );
    assert_eq!(codes(&check("![d](d.svg)\n", &fs)), vec!["E027"]);
  }

  #[test]
  fn test_svg_wrong_root_and_malformed() {
    let fs = MemoryFs::new()
      .with_file("docs/html.svg", "<html><body/></html>")
      .with_file("docs/broken.svg", "<svg viewBox=\"0 0 1 1\"><g></svg>");
    let issues = check("![a](html.svg)\n![b](broken.svg)\n", &fs);
    assert_eq!(codes(&issues), vec!["E026", "E026"]);
    assert!(issues[0].context.as_deref().unwrap_or_default().contains("<html>"));
  }

  #[test]
  fn test_large_and_unreadable_svg() {
    let padding = "<g/>".repeat(LARGE_SVG_BYTES / 4 + 1);
    let large = format!(r#"<svg width="10">{padding}</svg>"#);
    let fs = MemoryFs::new()
      .with_file("docs/large.svg", large)
      .with_file("docs/bin.svg", vec![0xffu8, 0x00]);
    let issues = check("![a](large.svg)\n![b](bin.svg)\n", &fs);
    assert_eq!(codes(&issues), vec!["E028", "E029"]);
  }
}
