use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use medscribe::{
    build_client, load_transcript, render_error, render_report, run_all, AnthropicConfig,
    ProviderKind, PROVIDER_ENV,
};

#[derive(Parser)]
#[command(name = "medscribe")]
#[command(
    author,
    version,
    about = "Process a physician-patient transcript into a medical summary, sentiment analysis and SOAP note",
    long_about = None
)]
struct Cli {
    /// Path to the transcript file (.txt or .docx)
    #[arg(long)]
    file: PathBuf,

    /// Completion backend [env: MEDSCRIBE_PROVIDER, default: canned]
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Model for the Anthropic provider (overrides ANTHROPIC_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug), written to stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Before logging and provider selection so RUST_LOG and
    // MEDSCRIBE_PROVIDER can come from the env file
    let env_loaded = load_env(cli.env_file.as_deref());
    setup_logging(cli.verbose);

    let result = match env_loaded {
        Ok(()) => run(cli).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{:#}", e);
            warn!("{}", message);
            match render_error(&message) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("{:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn load_env(env_file: Option<&Path>) -> Result<()> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {:?}", path))?;
        }
        None => {
            // A missing ./.env is fine
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("medscribe={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    info!("Loading transcript from {:?}", cli.file);
    let transcript = load_transcript(&cli.file)?;
    info!("Loaded {} chars", transcript.len());

    let provider = ProviderKind::resolve(cli.provider, std::env::var(PROVIDER_ENV).ok())?;
    let model = cli.model;
    let client = build_client(provider, || {
        Ok(AnthropicConfig::from_env()?.with_model(model))
    })?;
    info!("Using {:?} provider", provider);

    let report = run_all(client.as_ref(), &transcript).await;

    let failed = report.failed_sections();
    if !failed.is_empty() {
        warn!("Sections with errors: {}", failed.join(", "));
    }

    println!("{}", render_report(&report)?);
    Ok(())
}
