//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::ImporterConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    verbosity: String,
    message_format: String,
    lock_path: String,
    lock_timeout_secs: u64,
    enforce_required: bool,
    header_pattern: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            let lock_path = dispatcher::FileSinkOptions::from_config(&config.file_sink).lock_path;

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    verbosity: format!("{:?}", config.logging.verbosity),
                    message_format: format!("{:?}", config.logging.message_format),
                    lock_path: lock_path.display().to_string(),
                    lock_timeout_secs: config.file_sink.lock_timeout_secs,
                    enforce_required: config.import.enforce_required,
                    header_pattern: config.import.header_pattern.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ImporterConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.logging.verbosity == contracts::Verbosity::Suppressed {
        warnings.push("logging.verbosity is suppressed - no messages will be delivered".to_string());
    }

    if !config.import.enforce_required {
        warnings.push("import.enforce_required is off - rows without UserID are accepted".to_string());
    }

    if config.file_sink.lock_path.is_some() {
        warnings.push(
            "file_sink.lock_path is set - only writers sharing this path exclude each other"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Verbosity: {}", summary.verbosity);
            println!("  Message format: {}", summary.message_format);
            println!("  Lock file: {}", summary.lock_path);
            println!("  Lock timeout: {}s", summary.lock_timeout_secs);
            println!("  Required fields enforced: {}", summary.enforce_required);
            println!("  Header pattern: {}", summary.header_pattern);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_is_invalid() {
        let result = validate_config(&ValidateArgs {
            config: PathBuf::from("/nonexistent/training-import.toml"),
            json: false,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_valid_file_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("importer.toml");
        std::fs::write(&path, "[import]\nenforce_required = false\n").unwrap();

        let result = validate_config(&ValidateArgs {
            config: path,
            json: true,
        });
        assert!(result.valid);
        assert_eq!(result.warnings.map(|w| w.len()), Some(1));
        assert_eq!(result.summary.unwrap().lock_timeout_secs, 600);
    }

    #[test]
    fn test_out_of_range_timeout_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("importer.toml");
        std::fs::write(&path, "[file_sink]\nlock_timeout_secs = 0\n").unwrap();

        let result = validate_config(&ValidateArgs {
            config: path,
            json: false,
        });
        assert!(!result.valid);
    }
}
