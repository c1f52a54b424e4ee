use std::convert::Infallible;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use author_extract::download::{DownloadSink, ExportFormat};
use author_extract::upload::{SelectedFile, UploadOutcome};
use author_extract::{ClientConfig, ExtractorApp, HttpBackend};
use author_rows::render_text_table;
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "author-extract",
    version,
    about = "Send a paper to the author extraction service and export the authors it finds"
)]
struct Cli {
    /// Service base URL. Defaults to $AUTHOR_EXTRACT_BASE_URL or http://localhost:8000/.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds. Defaults to $AUTHOR_EXTRACT_TIMEOUT_SECS or 600.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload a PDF and list the authors of its references.
    Extract(ExtractArgs),
    /// Show the models the service accepts.
    Models,
    /// Check the service's dependencies.
    Health,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// PDF to upload.
    #[arg(short, long)]
    input: PathBuf,

    /// Model id. Defaults to the service's default model.
    #[arg(short, long)]
    model: Option<String>,

    /// Write authors.csv into the output directory.
    #[arg(long)]
    csv: bool,

    /// Write authors.xlsx into the output directory.
    #[arg(long)]
    xlsx: bool,

    /// Print the author table.
    #[arg(long)]
    table: bool,

    /// Directory for exported files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(base_url) = &cli.base_url {
        config = config
            .with_base_url(base_url)
            .with_context(|| format!("invalid --base-url '{base_url}'"))?;
    }
    if let Some(seconds) = cli.timeout_secs {
        config = config
            .with_timeout_secs(seconds)
            .context("invalid --timeout-secs")?;
    }
    Ok(config)
}

async fn report_progress(elapsed: &mut watch::Receiver<u64>) -> Infallible {
    loop {
        if elapsed.changed().await.is_err() {
            return std::future::pending().await;
        }
        let seconds = *elapsed.borrow_and_update();
        if seconds > 0 {
            eprintln!("Processing time: {seconds}s");
        }
    }
}

async fn run_extract(config: ClientConfig, args: &ExtractArgs) -> Result<ExitCode> {
    let config = config.with_output_dir(&args.out_dir);
    let sink = DownloadSink::new(config.output_dir.clone());
    let mut app = ExtractorApp::new(HttpBackend::new(config)?);

    app.mount().await;
    if let Some(advisory) = app.model_advisory() {
        eprintln!("note: {advisory}");
    }
    if let Some(model) = &args.model {
        app.select_model(model.clone());
    }

    let file = SelectedFile::from_path(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    if let Err(error) = app.select_file(Some(file)) {
        eprintln!("{}", error.message());
        return Ok(ExitCode::from(1));
    }

    let mut elapsed = app.upload().subscribe_elapsed();
    let outcome = tokio::select! {
        outcome = app.submit() => outcome,
        never = report_progress(&mut elapsed) => match never {},
    };
    println!("{}", outcome.message());

    let row_count = match outcome {
        UploadOutcome::Succeeded { rows, .. } => rows,
        UploadOutcome::Rejected(_) | UploadOutcome::Failed(_) => return Ok(ExitCode::from(1)),
    };
    if row_count == 0 {
        return Ok(ExitCode::from(2));
    }

    if args.table {
        print!("{}", render_text_table(app.upload().rows()));
    }

    let formats = [(args.csv, ExportFormat::Csv), (args.xlsx, ExportFormat::Xlsx)];
    for (_, format) in formats.into_iter().filter(|(requested, _)| *requested) {
        let path = app
            .export(format, &sink)
            .with_context(|| format!("failed to export {}", format.filename()))?;
        eprintln!("saved {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_models(config: ClientConfig) -> Result<ExitCode> {
    let mut app = ExtractorApp::new(HttpBackend::new(config)?);
    app.mount().await;

    if let Some(advisory) = app.model_advisory() {
        eprintln!("note: {advisory}");
    }
    let catalog = app.catalog();
    for model in catalog.models() {
        let marker = if model == catalog.default_model() { " (default)" } else { "" };
        println!("{model}{marker}");
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_health(config: ClientConfig) -> Result<ExitCode> {
    let mut app = ExtractorApp::new(HttpBackend::new(config)?);
    let probe = app.check_health().await;

    println!("{}", probe.render());
    Ok(if probe.error().is_some() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = build_config(&cli)?;
    match &cli.command {
        Commands::Extract(args) => run_extract(config, args).await,
        Commands::Models => run_models(config).await,
        Commands::Health => run_health(config).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("author_extract=info,author_rows=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
