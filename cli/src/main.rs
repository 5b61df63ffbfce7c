use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use log::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use scanrename::config::{load_config, validate_config, Config};
use scanrename::pipeline::{BatchRunner, Pipeline, TracingProgress};

/// Classify scanned documents with OCR and an LLM, then rename them in place.
#[derive(Debug, Parser)]
#[command(name = "scanrename", version, about)]
struct Cli {
    /// Images, PDFs or text files to process
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// JSON config file
    #[arg(short, long, env = "SCANRENAME_CONFIG")]
    config: Option<PathBuf>,

    /// OCR languages, comma separated (e.g. eng,rus)
    #[arg(long, value_delimiter = ',')]
    lang: Vec<String>,

    /// Chat model used for classification
    #[arg(long)]
    model: Option<String>,

    /// Pages of a PDF to read
    #[arg(long)]
    max_pages: Option<usize>,

    /// Keep path separators and raw whitespace in name fragments
    #[arg(long)]
    no_sanitize: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if !self.lang.is_empty() {
            config.ocr.languages = self.lang.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.ocr.max_pages = max_pages;
        }
        if self.no_sanitize {
            config.naming.sanitize = false;
        }
    }
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn,reqwest=warn", default_level)));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;
    tracing_log::LogTracer::init().context("Failed to bridge log records")?;

    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    info!("Starting scanrename v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate_config(&config).context("Invalid configuration")?;

    let pipeline = Pipeline::from_config(&config).context("Failed to set up pipeline")?;
    let summary = BatchRunner::new(&pipeline, &TracingProgress).run(&cli.paths);

    Ok(ExitCode::from(summary.exit_code() as u8))
}
