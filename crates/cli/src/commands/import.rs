//! `import` command implementation.

use anyhow::{Context, Result};
use contracts::{ImporterConfig, Verbosity};
use tracing::info;

use crate::cli::ImportArgs;
use crate::error::CliError;
use crate::pipeline::{ImportPipeline, PipelineConfig};

/// Execute the `import` command
pub async fn run_import(args: &ImportArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(CliError::file_not_found(&args.input).into());
    }

    let importer = load_config(args)?;
    info!(
        input = %args.input.display(),
        verbosity = ?importer.logging.verbosity,
        format = ?importer.logging.message_format,
        log_file = ?args.log_file,
        "Configuration loaded"
    );

    let pipeline = ImportPipeline::new(PipelineConfig {
        importer,
        input: args.input.clone(),
        log_file: args.log_file.clone(),
        fail_on_errors: args.fail_on_errors,
    });

    let summary = pipeline.run().await?;
    print!("{summary}");
    Ok(())
}

/// Configuration file (or defaults) with command-line overrides applied
fn load_config(args: &ImportArgs) -> Result<ImporterConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::file_not_found(path).into());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => ImporterConfig::default(),
    };

    apply_overrides(&mut config, args);
    config_loader::ConfigLoader::validate(&config).context("Invalid command-line override")?;
    Ok(config)
}

fn apply_overrides(config: &mut ImporterConfig, args: &ImportArgs) {
    if let Some(format) = args.format {
        config.logging.message_format = format.into();
    }
    if args.verbose_messages {
        config.logging.verbosity = Verbosity::Verbose;
    }
    if args.silent {
        config.logging.verbosity = Verbosity::Suppressed;
    }
    if let Some(secs) = args.lock_timeout {
        config.file_sink.lock_timeout_secs = secs;
    }
    if let Some(ref path) = args.lock_path {
        config.file_sink.lock_path = Some(path.clone());
    }
}
