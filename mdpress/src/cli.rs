use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mdpress_analysis::Theme;
use mdpress_config::{Config, ConfigError};

/// Command line interface for mdpress
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "mdpress: Markdown to HTML with anchors, numbering, TOC and linting"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", global = true, action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the mdpress CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new mdpress configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "mdpress.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Convert Markdown documents to standalone HTML pages.
  Convert {
    /// A Markdown file or a directory searched recursively for `.md` files.
    input: Option<PathBuf>,

    /// Output directory for generated pages.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Insert a table of contents.
    #[arg(long, conflicts_with = "no_toc")]
    toc: bool,

    /// Never insert a table of contents.
    #[arg(long)]
    no_toc: bool,

    /// Deepest heading level listed in the table of contents and numbered.
    #[arg(long = "toc-levels", value_parser = clap::value_parser!(u8).range(1..=6))]
    toc_levels: Option<u8>,

    /// Prefix headings with dotted section numbers.
    #[arg(short = 'n', long = "number-headings")]
    number_headings: bool,

    /// Fallback page title for documents without one.
    #[arg(short = 'T', long)]
    title: Option<String>,

    /// Stylesheet copied next to the output and linked from every page.
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Conversion template to apply (see `mdpress templates`).
    #[arg(short = 't', long)]
    template: Option<String>,

    /// Color scheme of the built-in stylesheet: light, dark or auto.
    #[arg(long)]
    theme: Option<Theme>,

    /// Validate the documents first and print the report. Conversion goes
    /// ahead even when errors are found.
    #[arg(short = 'V', long)]
    validate: bool,
  },

  /// Lint Markdown documents and print a report.
  Validate {
    /// A Markdown file or a directory searched recursively for `.md` files.
    input: Option<PathBuf>,

    /// Include hints, context and line numbers for every issue.
    #[arg(short, long)]
    details: bool,

    /// Report format.
    #[arg(short = 'F', long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,
  },

  /// List the conversion templates available to `convert --template`.
  Templates,
}

impl Cli {
  /// Parse command line arguments
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

impl Commands {
  /// Merge command line flags into a loaded configuration. A selected
  /// template is applied first; other flags win over it, over configuration
  /// files and over overrides.
  ///
  /// # Errors
  ///
  /// Returns an error if the selected template does not exist.
  pub fn apply_to(&self, config: &mut Config) -> Result<(), ConfigError> {
    match self {
      Self::Init { .. } | Self::Templates => {},
      Self::Convert {
        input,
        output_dir,
        jobs,
        toc,
        no_toc,
        toc_levels,
        number_headings,
        title,
        stylesheet,
        template,
        theme,
        validate: _,
      } => {
        if let Some(template) = template {
          config.apply_template(template)?;
        }
        if let Some(input) = input {
          config.input_dir = Some(input.clone());
        }
        if let Some(output_dir) = output_dir {
          config.output_dir.clone_from(output_dir);
        }
        if jobs.is_some() {
          config.jobs = *jobs;
        }
        if *toc {
          config.toc.enable = true;
        } else if *no_toc {
          config.toc.enable = false;
        }
        if let Some(levels) = toc_levels {
          config.toc.max_depth = *levels;
        }
        if *number_headings {
          config.toc.numbering = true;
        }
        if title.is_some() {
          config.title.clone_from(title);
        }
        if stylesheet.is_some() {
          config.stylesheet.clone_from(stylesheet);
        }
        if let Some(theme) = theme {
          config.style.theme = *theme;
        }
      },
      Self::Validate { input, jobs, .. } => {
        if let Some(input) = input {
          config.input_dir = Some(input.clone());
        }
        if jobs.is_some() {
          config.jobs = *jobs;
        }
      },
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use super::*;

  #[test]
  fn test_convert_flags() {
    let cli = Cli::try_parse_from([
      "mdpress",
      "convert",
      "docs",
      "--toc-levels",
      "2",
      "-n",
      "--config",
      "language=de",
    ])
    .unwrap();

    assert_eq!(cli.config_overrides, vec!["language=de".to_string()]);
    match cli.command {
      Commands::Convert {
        input,
        toc_levels,
        number_headings,
        toc,
        no_toc,
        ..
      } => {
        assert_eq!(input, Some(PathBuf::from("docs")));
        assert_eq!(toc_levels, Some(2));
        assert!(number_headings);
        assert!(!toc && !no_toc);
      },
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn test_toc_level_range_enforced() {
    assert!(Cli::try_parse_from(["mdpress", "convert", "--toc-levels", "7"]).is_err());
    assert!(Cli::try_parse_from(["mdpress", "convert", "--toc", "--no-toc"]).is_err());
  }

  #[test]
  fn test_flags_override_config() {
    let cli = Cli::try_parse_from([
      "mdpress",
      "convert",
      "--no-toc",
      "--toc-levels",
      "4",
      "-o",
      "site",
      "-T",
      "Manual",
    ])
    .unwrap();

    let mut config = Config::default();
    cli.command.apply_to(&mut config).unwrap();

    assert!(!config.toc.enable);
    assert_eq!(config.toc.max_depth, 4);
    assert!(!config.toc.numbering);
    assert_eq!(config.output_dir, PathBuf::from("site"));
    assert_eq!(config.title.as_deref(), Some("Manual"));
    assert_eq!(config.input_dir, None);
  }

  #[test]
  fn test_unset_flags_keep_config() {
    let cli = Cli::try_parse_from(["mdpress", "convert"]).unwrap();
    let mut config = Config::default();
    config.toc.numbering = true;
    config.jobs = Some(3);
    cli.command.apply_to(&mut config).unwrap();
    assert!(config.toc.enable);
    assert!(config.toc.numbering);
    assert_eq!(config.jobs, Some(3));
  }

  #[test]
  fn test_template_then_flags() {
    let cli = Cli::try_parse_from([
      "mdpress",
      "convert",
      "--template",
      "report",
      "--theme",
      "dark",
    ])
    .unwrap();
    let mut config = Config::default();
    cli.command.apply_to(&mut config).unwrap();
    assert_eq!(config.style.font_family, "Times New Roman, serif");
    assert!(config.toc.numbering);
    assert_eq!(config.style.theme, Theme::Dark);

    let cli = Cli::try_parse_from(["mdpress", "convert", "-t", "dark", "--theme", "auto"])
      .unwrap();
    let mut config = Config::default();
    cli.command.apply_to(&mut config).unwrap();
    assert_eq!(config.style.theme, Theme::Auto);
  }

  #[test]
  fn test_unknown_template_and_theme() {
    let cli = Cli::try_parse_from(["mdpress", "convert", "-t", "poster"]).unwrap();
    let err = cli.command.apply_to(&mut Config::default()).unwrap_err();
    assert!(err.to_string().contains("Unknown template: 'poster'"));

    assert!(Cli::try_parse_from(["mdpress", "convert", "--theme", "sepia"]).is_err());
  }

  #[test]
  fn test_templates_command() {
    let cli = Cli::try_parse_from(["mdpress", "templates"]).unwrap();
    assert!(matches!(cli.command, Commands::Templates));
  }

  #[test]
  fn test_validate_defaults() {
    let cli = Cli::try_parse_from(["mdpress", "-v", "validate"]).unwrap();
    assert!(cli.verbose);
    match cli.command {
      Commands::Validate {
        input,
        details,
        format,
        jobs,
      } => {
        assert_eq!(input, None);
        assert!(!details);
        assert_eq!(format, "text");
        assert_eq!(jobs, None);
      },
      other => panic!("unexpected command: {other:?}"),
    }
  }
}
