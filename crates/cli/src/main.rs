mod cli;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shortify_core::{
    load_config, load_config_or_default, metrics, validate_config, Config, FfmpegEngine,
    HttpFetcher, LocalFile, Orchestrator, Selection, TranscodeEngine,
};

use cli::{Cli, Commands, GenerateArgs};

/// Config file looked up in the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "shortify.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => generate(config, args).await,
        Commands::CheckEngine => check_engine(config).await,
        Commands::ShowConfig { json } => show_config(&config, json),
    }
}

/// An explicit config path must exist; the default one is optional.
fn load(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_or_default(&PathBuf::from(DEFAULT_CONFIG_FILE))
            .context("Failed to load configuration")?,
    };

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

async fn generate(config: Config, args: GenerateArgs) -> Result<()> {
    let file = match &args.file {
        Some(path) => Some(
            LocalFile::read(path)
                .await
                .with_context(|| format!("Failed to read {:?}", path))?,
        ),
        None => None,
    };
    let selection = Selection {
        file,
        url: args.url.clone(),
    };

    let engine = Arc::new(FfmpegEngine::new(config.engine.clone()));
    let fetcher =
        Arc::new(HttpFetcher::new(&config.source).context("Failed to create HTTP client")?);
    let orchestrator = Orchestrator::new(engine, fetcher, config.orchestrator.clone());
    let sink = orchestrator.sink().clone();

    let renderer = tokio::spawn(render::render_events(
        orchestrator.subscribe_events(),
        args.json_events,
    ));

    let result = orchestrator.submit(selection).await;

    // Closing the event channel lets the renderer drain and exit
    drop(orchestrator);
    renderer.await.context("Event renderer panicked")?;

    if args.metrics {
        print!("{}", metrics::gather_text().context("Failed to encode metrics")?);
    }

    let handle = match result {
        Ok(handle) => handle,
        // The remediation notice has already been printed by the renderer
        Err(e) => return Err(e).context("No clip was generated"),
    };

    let written = sink
        .download(&handle, &args.output)
        .await
        .context("Failed to save the clip")?;
    sink.retire(&handle).await;

    println!("Saved {} bytes to {}", written, args.output.display());
    Ok(())
}

async fn check_engine(config: Config) -> Result<()> {
    let engine = FfmpegEngine::new(config.engine);
    engine
        .initialize()
        .await
        .context("Transcoding engine is not usable")?;

    println!(
        "Engine '{}' is ready (working storage: {})",
        engine.name(),
        engine.work_dir().display()
    );
    Ok(())
}

fn show_config(config: &Config, json: bool) -> Result<()> {
    let rendered = if json {
        serde_json::to_string_pretty(config).context("Failed to serialize config")?
    } else {
        toml::to_string_pretty(config).context("Failed to serialize config")?
    };
    println!("{}", rendered);
    Ok(())
}
