use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yt_transcript_tools::cli::{Cli, Commands};
use yt_transcript_tools::config::Config;
use yt_transcript_tools::output;
use yt_transcript_tools::provider::YoutubeTranscriptProvider;
use yt_transcript_tools::server::TranscriptServer;
use yt_transcript_tools::tools::TranscriptTools;
use yt_transcript_tools::transcripts::TranscriptService;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout is reserved for results and the server protocol
    init_tracing(cli.verbose, cli.json_logs);

    let config = match cli.command {
        Commands::Config { init: true, .. } => Config::default(),
        _ => Config::load(cli.config.as_deref()).await?,
    };
    let output_path = cli.output.as_deref();

    match cli.command {
        Commands::Serve => {
            let tools = build_tools(&config)?;
            let server = TranscriptServer::new(tools, config.server.name.clone());
            server.run_stdio().await?;
        }
        Commands::Transcript { video, language } => {
            let service = build_service(&config)?;
            let language = language.unwrap_or_else(|| config.defaults.language.clone());

            let progress = spinner(cli.quiet, "Fetching transcript...");
            let result = service.get_transcript(&video, &language).await;
            finish(progress);

            output::emit(&result?, output_path).await?;
        }
        Commands::Timestamps { video, language } => {
            let service = build_service(&config)?;
            let language = language.unwrap_or_else(|| config.defaults.language.clone());

            let progress = spinner(cli.quiet, "Fetching transcript...");
            let result = service.get_transcript_with_timestamps(&video, &language).await;
            finish(progress);

            output::emit(&result?, output_path).await?;
        }
        Commands::Languages { video } => {
            let service = build_service(&config)?;

            let progress = spinner(cli.quiet, "Listing transcripts...");
            let result = service.list_available_transcripts(&video).await;
            finish(progress);

            output::emit(&output::to_pretty_json(&result?)?, output_path).await?;
        }
        Commands::Segment { video, start, end, language } => {
            let service = build_service(&config)?;
            let language = language.unwrap_or_else(|| config.defaults.language.clone());

            let progress = spinner(cli.quiet, "Fetching transcript segment...");
            let result = service
                .get_transcript_segment(&video, start, end, &language)
                .await;
            finish(progress);

            output::emit(&result?, output_path).await?;
        }
        Commands::Search { video, term, language } => {
            let service = build_service(&config)?;
            let language = language.unwrap_or_else(|| config.defaults.language.clone());

            let progress = spinner(cli.quiet, "Searching transcript...");
            let result = service.search_transcript(&video, &term, &language).await;
            finish(progress);

            let matches = result?;
            let content = if matches.is_empty() {
                output::no_matches_message(&term)
            } else {
                output::to_pretty_json(&matches)?
            };
            output::emit(&content, output_path).await?;
        }
        Commands::Tools { commands } => {
            let tools = build_tools(&config)?;
            let definitions = if commands {
                tools.command_definitions()
            } else {
                tools.definitions()
            };
            output::emit(&output::to_pretty_json(&definitions)?, output_path).await?;
        }
        Commands::Config { show, init } => {
            if init {
                let path = config.save(cli.config.as_deref()).await?;
                println!("Configuration written to: {}", path.display());
            } else if show {
                config.display();
            } else {
                println!("Configuration file: {}", match cli.config.as_deref() {
                    Some(path) => path.display().to_string(),
                    None => Config::config_path()?.display().to_string(),
                });
                println!("Run with --show to print it or --init to write the defaults.");
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "yt_transcript_tools=debug"
    } else {
        "yt_transcript_tools=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_service(config: &Config) -> Result<TranscriptService> {
    let provider = YoutubeTranscriptProvider::new(&config.provider)?;
    Ok(TranscriptService::new(Arc::new(provider)))
}

fn build_tools(config: &Config) -> Result<TranscriptTools> {
    let service = build_service(config)?;
    Ok(TranscriptTools::new(service).with_default_language(config.defaults.language.clone()))
}

fn spinner(quiet: bool, message: &str) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        progress.set_style(style);
    }
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(100));
    Some(progress)
}

fn finish(progress: Option<ProgressBar>) {
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
}
