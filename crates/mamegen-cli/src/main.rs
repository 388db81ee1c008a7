mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;

use mamegen_core::{DslError, OutputFormat};
use mamegen_generate::output::{resolve_encoding, write_rows_csv, write_rows_json};
use mamegen_generate::{GenerateOptions, GenerationEngine, OutputError};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Dsl(#[from] DslError),
    #[error("{0}")]
    Output(#[from] OutputError),
    #[error("failed to read spec file: {path} ({source})")]
    ReadSpec {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    /// 2 for DSL and encoding errors, 3 for file I/O.
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Dsl(_) | CliError::Output(OutputError::UnsupportedEncoding(_)) => 2,
            CliError::Output(_) | CliError::ReadSpec { .. } => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mamegen", version, about = "Generate mock data from a .mgen DSL spec")]
struct Cli {
    /// Path to the .mgen DSL file.
    spec: PathBuf,
    /// Output path (.csv or .json).
    out: PathBuf,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => {
            println!("OK -> {}", cli.out.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    tracing::info!(event = "run_started", spec = %cli.spec.display());

    let source = std::fs::read_to_string(&cli.spec).map_err(|source| CliError::ReadSpec {
        path: cli.spec.clone(),
        source,
    })?;

    let program = mamegen_dsl::compile(&source)?;
    tracing::info!(
        event = "program_analysed",
        columns = program.header.len(),
        count = program.config.count
    );

    let engine = GenerationEngine::new(GenerateOptions::default());
    let rows = engine.run(&program)?;
    tracing::info!(event = "rows_generated", rows = rows.len());

    // The output extension overrides CONFIG.type when recognised.
    let format = format_for(&cli.out).unwrap_or(program.config.format);
    resolve_encoding(&program.config.encoding)?;

    match format {
        OutputFormat::Json => write_rows_json(&cli.out, &program.header, &rows)?,
        OutputFormat::Csv => write_rows_csv(&cli.out, &program.header, &rows, &program.config)?,
    }
    tracing::info!(event = "output_written", path = %cli.out.display());

    Ok(())
}

fn format_for(path: &Path) -> Option<OutputFormat> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") => Some(OutputFormat::Json),
        Some("csv") => Some(OutputFormat::Csv),
        _ => None,
    }
}
