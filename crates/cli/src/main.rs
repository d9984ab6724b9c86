//! # Training Import CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 训练记录导入 (控制台 + 可选日志文件)
//! - 配置加载与验证
//! - 提取文件表头检查

mod cli;
mod commands;
mod error;
mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use observability::{LogFormat, ObservabilityConfig};
use tracing::debug;

use cli::{Cli, Commands};
use commands::{run_import, run_info, run_validate};
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    if let Err(e) = observability::init_with_config(observability_config(&cli)) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        "Training import CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Import(args) => run_import(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            if matches!(e.downcast_ref::<CliError>(), Some(CliError::Cancelled)) {
                // The runtime would otherwise join the lock waiter still blocked in spawn_blocking
                std::process::exit(i32::from(code));
            }
            ExitCode::from(code)
        }
    }
}

/// Map CLI flags onto the tracing setup
fn observability_config(cli: &Cli) -> ObservabilityConfig {
    let default_log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    ObservabilityConfig {
        log_format: match cli.log_format {
            cli::LogFormat::Json => LogFormat::Json,
            cli::LogFormat::Pretty => LogFormat::Pretty,
            cli::LogFormat::Compact => LogFormat::Compact,
        },
        metrics_port: cli.metrics_port,
        default_log_level: default_log_level.to_string(),
    }
}
