use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use author_rows::{ConversionReport, ConversionTargets, convert_response_file};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "papers2csv",
    version,
    about = "Flatten saved author-extraction responses into CSV or Excel"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a saved /process-pdf JSON response.
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input JSON path (an array of paper entries).
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Output Excel workbook path.
    #[arg(long)]
    xlsx: Option<PathBuf>,
}

fn run_convert(args: &ConvertArgs) -> Result<ConversionReport> {
    if args.csv.is_none() && args.xlsx.is_none() {
        anyhow::bail!("nothing to write; pass --csv and/or --xlsx");
    }

    let targets = ConversionTargets {
        csv: args.csv.as_deref(),
        xlsx: args.xlsx.as_deref(),
    };
    convert_response_file(&args.input, targets)
        .with_context(|| format!("failed to convert '{}'", args.input.display()))
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("author_rows=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => match run_convert(&args) {
            Ok(report) => {
                eprintln!(
                    "converted {} entries into {} author rows",
                    report.entry_count, report.row_count
                );
                if report.row_count > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
