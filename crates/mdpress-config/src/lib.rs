pub mod config;
pub mod error;
pub mod templates;

pub use config::{
  Config,
  MetadataConfig,
  TemplateConfig,
  TocConfig,
  ValidationConfig,
  builtin_templates,
};
pub use error::ConfigError;
