use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
  str::FromStr,
};

use mdpress_analysis::{StructureOptions, StyleSettings, Theme, ValidationOptions};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File names searched, in order, when no config file is given.
pub const CONFIG_FILENAMES: [&str; 4] = [
  "mdpress.toml",
  "mdpress.json",
  ".mdpress.toml",
  ".config/mdpress.toml",
];

/// Configuration for mdpress.
///
/// Loaded from TOML or JSON; every field has a default so partial files are
/// valid. Several files merge key by key, later files winning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory containing the Markdown sources.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub input_dir: Option<PathBuf>,

  /// Directory converted documents are written to.
  pub output_dir: PathBuf,

  /// Worker threads for batch operations.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub jobs: Option<usize>,

  /// Fallback document title.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,

  /// Document language for the `<html lang>` attribute.
  pub language: String,

  /// Stylesheet linked from converted documents. When unset, the built-in
  /// stylesheet described by `style` is embedded.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stylesheet: Option<PathBuf>,

  /// Built-in stylesheet settings.
  pub style: StyleSettings,

  /// Document metadata defaults.
  pub metadata: MetadataConfig,

  /// Table of contents and numbering.
  pub toc: TocConfig,

  /// Validation rules.
  pub validation: ValidationConfig,

  /// Named conversion templates, selected with `convert --template`. These
  /// are added to the built-in ones, replacing any with the same name.
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub templates: BTreeMap<String, TemplateConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:  None,
      output_dir: PathBuf::from("output"),
      jobs:       None,
      title:      None,
      language:   "en".to_string(),
      stylesheet: None,
      style:      StyleSettings::default(),
      metadata:   MetadataConfig::default(),
      toc:        TocConfig::default(),
      validation: ValidationConfig::default(),
      templates:  BTreeMap::new(),
    }
  }
}

/// Fallbacks for document metadata missing from front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
  /// Author used when a document's front matter has none.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default_author: Option<String>,

  /// Title used when a document has no front matter title, no level-1
  /// heading and no configured `title`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default_title: Option<String>,
}

/// A named set of conversion settings applied over the loaded
/// configuration. Unset fields leave the configuration untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stylesheet:  Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub language:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub theme:       Option<Theme>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub font_family: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub margins:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub page_size:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub numbering:   Option<bool>,
}

impl TemplateConfig {
  fn apply(&self, config: &mut Config) {
    if self.stylesheet.is_some() {
      config.stylesheet.clone_from(&self.stylesheet);
    }
    if let Some(language) = &self.language {
      config.language.clone_from(language);
    }
    if let Some(theme) = self.theme {
      config.style.theme = theme;
    }
    if let Some(font_family) = &self.font_family {
      config.style.font_family.clone_from(font_family);
    }
    if let Some(margins) = &self.margins {
      config.style.margins.clone_from(margins);
    }
    if let Some(page_size) = &self.page_size {
      config.style.page_size.clone_from(page_size);
    }
    if let Some(numbering) = self.numbering {
      config.toc.numbering = numbering;
    }
  }
}

/// Templates available without any configuration.
#[must_use]
pub fn builtin_templates() -> BTreeMap<String, TemplateConfig> {
  let report = TemplateConfig {
    description: Some("Serif report layout with numbered sections".to_string()),
    font_family: Some("Times New Roman, serif".to_string()),
    margins: Some("2.5cm".to_string()),
    page_size: Some("A4".to_string()),
    numbering: Some(true),
    ..TemplateConfig::default()
  };
  let presentation = TemplateConfig {
    description: Some("Compact sans-serif layout for slides and handouts".to_string()),
    font_family: Some("Arial, sans-serif".to_string()),
    margins: Some("1.5cm".to_string()),
    page_size: Some("A4".to_string()),
    ..TemplateConfig::default()
  };
  let dark = TemplateConfig {
    description: Some("Default layout with the dark theme".to_string()),
    theme: Some(Theme::Dark),
    ..TemplateConfig::default()
  };

  BTreeMap::from([
    ("dark".to_string(), dark),
    ("presentation".to_string(), presentation),
    ("report".to_string(), report),
  ])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
  pub enable:    bool,
  pub max_depth: u8,
  pub numbering: bool,
  pub title:     String,
}

impl Default for TocConfig {
  fn default() -> Self {
    let defaults = StructureOptions::default();
    Self {
      enable:    defaults.toc,
      max_depth: defaults.max_heading_depth,
      numbering: defaults.enable_numbering,
      title:     defaults.toc_title,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
  pub check_broken_links:   bool,
  pub check_missing_images: bool,
  pub check_empty_files:    bool,
  pub max_file_size_mb:     u64,
  pub max_line_length:      usize,
  pub max_emojis:           usize,
  pub allowed_non_ascii:    String,
}

impl Default for ValidationConfig {
  fn default() -> Self {
    let defaults = ValidationOptions::default();
    Self {
      check_broken_links:   defaults.check_broken_links,
      check_missing_images: defaults.check_missing_images,
      check_empty_files:    defaults.check_empty_files,
      max_file_size_mb:     defaults.max_file_size_mb,
      max_line_length:      defaults.max_line_length,
      max_emojis:           defaults.max_emojis,
      allowed_non_ascii:    defaults.allowed_non_ascii,
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    Self::from_table(read_table(path.as_ref())?)
  }

  /// Load and merge configuration files, falling back to a discovered file,
  /// then apply `KEY=VALUE` overrides.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if config_files.is_empty() {
      match Self::find_config_file() {
        Some(discovered) => {
          log::info!("Using discovered config file: {}", discovered.display());
          Self::from_file(&discovered)?
        },
        None => Self::default(),
      }
    } else {
      let mut merged = toml::Table::new();
      for path in config_files {
        merge_tables(&mut merged, read_table(path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      Self::from_table(merged)?
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
    toml::Value::Table(table)
      .try_into()
      .map_err(|e: toml::de::Error| ConfigError::Config(format!("Invalid configuration: {e}")))
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Nested keys use dots, for example `toc.max_depth=2`. An empty value
  /// clears optional fields.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is malformed, the key is unknown or the
  /// value does not parse as the field's type.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
      "input_dir" => self.input_dir = non_empty(value).map(PathBuf::from),
      "output_dir" => self.output_dir = PathBuf::from(value),
      "jobs" => self.jobs = optional_parsed(key, value)?,
      "title" => self.title = non_empty(value).map(str::to_string),
      "language" => self.language = value.to_string(),
      "stylesheet" => self.stylesheet = non_empty(value).map(PathBuf::from),

      "style.theme" => self.style.theme = parse_value(key, value)?,
      "style.font_family" => self.style.font_family = value.to_string(),
      "style.margins" => self.style.margins = value.to_string(),
      "style.page_size" => self.style.page_size = value.to_string(),

      "metadata.default_author" => {
        self.metadata.default_author = non_empty(value).map(str::to_string);
      },
      "metadata.default_title" => {
        self.metadata.default_title = non_empty(value).map(str::to_string);
      },

      "toc.enable" => self.toc.enable = parse_bool(key, value)?,
      "toc.max_depth" => {
        let depth: u8 = parse_value(key, value)?;
        if !(1..=6).contains(&depth) {
          return Err(ConfigError::Config(format!(
            "Invalid value for '{key}': '{value}'. Expected a heading level \
             between 1 and 6"
          )));
        }
        self.toc.max_depth = depth;
      },
      "toc.numbering" => self.toc.numbering = parse_bool(key, value)?,
      "toc.title" => self.toc.title = value.to_string(),

      "validation.check_broken_links" => {
        self.validation.check_broken_links = parse_bool(key, value)?;
      },
      "validation.check_missing_images" => {
        self.validation.check_missing_images = parse_bool(key, value)?;
      },
      "validation.check_empty_files" => {
        self.validation.check_empty_files = parse_bool(key, value)?;
      },
      "validation.max_file_size_mb" => {
        self.validation.max_file_size_mb = parse_value(key, value)?;
      },
      "validation.max_line_length" => {
        self.validation.max_line_length = parse_value(key, value)?;
      },
      "validation.max_emojis" => {
        self.validation.max_emojis = parse_value(key, value)?;
      },
      "validation.allowed_non_ascii" => {
        self.validation.allowed_non_ascii = value.to_string();
      },

      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }

  /// Every template that can be selected: the built-in ones plus those
  /// defined in the configuration, by name.
  #[must_use]
  pub fn available_templates(&self) -> BTreeMap<String, TemplateConfig> {
    let mut templates = builtin_templates();
    templates.extend(
      self
        .templates
        .iter()
        .map(|(name, template)| (name.clone(), template.clone())),
    );
    templates
  }

  /// Apply the named template over the current settings.
  ///
  /// # Errors
  ///
  /// Returns an error if no template has that name.
  pub fn apply_template(&mut self, name: &str) -> Result<(), ConfigError> {
    let templates = self.available_templates();
    let Some(template) = templates.get(name) else {
      let known = templates.keys().map(String::as_str).collect::<Vec<_>>();
      return Err(ConfigError::Config(format!(
        "Unknown template: '{name}'. Available templates: {}",
        known.join(", ")
      )));
    };
    log::debug!("Applying template '{name}'");
    template.apply(self);
    Ok(())
  }

  /// Options for the heading structure pass.
  #[must_use]
  pub fn structure_options(&self) -> StructureOptions {
    StructureOptions {
      toc:               self.toc.enable,
      max_heading_depth: self.toc.max_depth,
      enable_numbering:  self.toc.numbering,
      toc_title:         self.toc.title.clone(),
    }
  }

  /// Options for the validator.
  #[must_use]
  pub fn validation_options(&self) -> ValidationOptions {
    let v = &self.validation;
    ValidationOptions {
      check_broken_links:   v.check_broken_links,
      check_missing_images: v.check_missing_images,
      check_empty_files:    v.check_empty_files,
      max_file_size_mb:     v.max_file_size_mb,
      max_line_length:      v.max_line_length,
      max_emojis:           v.max_emojis,
      allowed_non_ascii:    v.allowed_non_ascii.clone(),
    }
  }

  /// Search for a config file in the current directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    Self::find_config_file_in(&current_dir)
  }

  /// Search for a config file in `dir`.
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
  }

  /// Write a default configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let content = crate::templates::default_config(format)?;

    fs::write(path, content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

#[allow(
  clippy::option_if_let_else,
  reason = "Clearer with explicit match on extension"
)]
fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
  let content = fs::read_to_string(path).map_err(|e| {
    ConfigError::Config(format!(
      "Failed to read config file: {}: {}",
      path.display(),
      e
    ))
  })?;

  match path.extension().and_then(|ext| ext.to_str()) {
    Some(ext) => {
      match ext.to_lowercase().as_str() {
        "json" => {
          serde_json::from_str(&content).map_err(|e| {
            ConfigError::Config(format!(
              "Failed to parse JSON config from {}: {}",
              path.display(),
              e
            ))
          })
        },
        "toml" => {
          toml::from_str(&content).map_err(|e| {
            ConfigError::Config(format!(
              "Failed to parse TOML config from {}: {}",
              path.display(),
              e
            ))
          })
        },
        _ => {
          Err(ConfigError::Config(format!(
            "Unsupported config file format: {}",
            path.display()
          )))
        },
      }
    },
    None => {
      Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )))
    },
  }
}

/// Merge `other` into `base`. Nested tables merge recursively; any other
/// value in `other` replaces the one in `base`.
fn merge_tables(base: &mut toml::Table, other: toml::Table) {
  for (key, value) in other {
    match (base.get_mut(&key), value) {
      (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
        merge_tables(existing, incoming);
      },
      (_, value) => {
        base.insert(key, value);
      },
    }
  }
}

fn non_empty(value: &str) -> Option<&str> {
  (!value.is_empty()).then_some(value)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  value.parse().map_err(|e| {
    ConfigError::Config(format!("Invalid value for '{key}': '{value}' - {e}"))
  })
}

fn optional_parsed<T>(key: &str, value: &str) -> Result<Option<T>, ConfigError>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  non_empty(value)
    .map(|value| parse_value(key, value))
    .transpose()
}
