//! `info` command implementation.

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Extract info for JSON output
#[derive(Serialize)]
struct ExtractInfo {
    input: String,
    header_found: bool,
    preamble_lines: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unknown_columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_columns: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(input = %args.input.display(), "Inspecting extract");

    if !args.input.exists() {
        return Err(CliError::file_not_found(&args.input).into());
    }

    let extract = inspect(args)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&extract).context("Failed to serialize extract info")?;
        println!("{}", json);
    } else {
        print_extract_info(&extract);
    }

    Ok(())
}

fn inspect(args: &InfoArgs) -> Result<ExtractInfo> {
    let header = Regex::new(&args.header_pattern)
        .with_context(|| format!("Invalid header pattern '{}'", args.header_pattern))?;
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let preamble = ingestion::split_preamble(&mut BufReader::new(file), &header)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let columns = preamble.columns();

    let known = ingestion::TrainingRecord::COLUMNS;
    let unknown_columns = columns
        .iter()
        .filter(|c| !known.contains(&c.as_str()))
        .cloned()
        .collect();
    let missing_columns = if preamble.header.is_some() {
        known
            .iter()
            .filter(|k| !columns.iter().any(|c| c == *k))
            .map(|k| k.to_string())
            .collect()
    } else {
        Vec::new()
    };

    Ok(ExtractInfo {
        input: args.input.display().to_string(),
        header_found: preamble.header.is_some(),
        preamble_lines: preamble.skipped,
        columns,
        unknown_columns,
        missing_columns,
    })
}

fn print_extract_info(extract: &ExtractInfo) {
    println!("\n=== Extract Information ===\n");
    println!("Input: {}", extract.input);

    if !extract.header_found {
        println!("Header: not found ({} lines scanned)", extract.preamble_lines);
        println!();
        return;
    }

    println!("Preamble lines: {}", extract.preamble_lines);
    println!("\nColumns ({}):", extract.columns.len());
    for column in &extract.columns {
        println!("  - {}", column);
    }

    if !extract.unknown_columns.is_empty() {
        println!("\nIgnored columns: {}", extract.unknown_columns.join(", "));
    }
    if !extract.missing_columns.is_empty() {
        println!("Absent columns: {}", extract.missing_columns.join(", "));
    }

    println!();
}
