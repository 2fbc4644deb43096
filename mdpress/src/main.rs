use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, error, info, warn};
use mdpress::{
  cli::{Cli, Commands},
  convert,
  lint,
};
use mdpress_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Commands::Init {
    output,
    format,
    force,
  } = &cli.command
  {
    return init_config(output, format, *force);
  }

  // Create configuration from config files, overrides and flags
  let mut config = Config::load(&cli.config_files, &cli.config_overrides)?;
  cli.command.apply_to(&mut config)?;

  // Setup thread pool once for all parallel operations
  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build_global()?;

  let input = config
    .input_dir
    .clone()
    .unwrap_or_else(|| PathBuf::from("."));

  match &cli.command {
    Commands::Convert { validate, .. } => {
      if *validate {
        let results = lint::validate_input(&config, &input);
        println!("{}", lint::render_report(&results, "text", cli.verbose)?);
        let summary = lint::log_verdict(&results);
        if summary.invalid_files > 0 {
          warn!("Converting anyway; fix the errors above for clean output");
        }
      }
      convert_all(&config, &input)
    },

    Commands::Validate {
      details, format, ..
    } => {
      let results = lint::validate_input(&config, &input);
      println!("{}", lint::render_report(&results, format, *details)?);
      let summary = lint::log_verdict(&results);
      if summary.invalid_files > 0 {
        bail!("{} files failed validation", summary.invalid_files);
      }
      Ok(())
    },

    Commands::Templates => {
      println!("{}", convert::describe_templates(&config));
      Ok(())
    },

    Commands::Init { .. } => Ok(()),
  }
}

fn init_config(output: &Path, format: &str, force: bool) -> Result<()> {
  // Check if file already exists and that we're not forcing overwrite
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  // Create parent directories if needed
  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!(
      "Failed to generate configuration file: {}",
      output.display()
    )
  })?;

  info!(
    "Configuration file created successfully. Edit it to customize conversion \
     and validation."
  );
  Ok(())
}

/// Main conversion process
fn convert_all(config: &Config, input: &Path) -> Result<()> {
  info!("Starting conversion...");
  info!("Output directory: {}", config.output_dir.display());

  let report = convert::convert_documents(config, input)?;

  for (file, message) in &report.failed {
    error!("Failed to convert {}: {message}", file.display());
  }
  info!(
    "Converted {} of {} documents ({} skipped)",
    report.converted.len(),
    report.total(),
    report.skipped.len()
  );

  if !report.is_success() {
    bail!(
      "Failed to convert {} of {} documents",
      report.failed.len(),
      report.total()
    );
  }
  Ok(())
}
