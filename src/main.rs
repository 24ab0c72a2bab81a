//! mlchat - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

use mlchat::{
    cli::{Args, Commands, Config, Verbosity},
    completion::gemini::API_KEY_ENV,
    conversation::ConversationState,
    doctor::Doctor,
    index::{QdrantIndex, UnavailableIndex, VectorIndex},
    logging,
    rag::QueryPipeline,
    repl::{display::DisplayManager, ReplConfig, ReplSession},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), msg);
        std::process::exit(2);
    }

    logging::init_tracing(args.verbosity())?;

    // Validated only after command-line overrides are applied
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    match &args.command {
        Some(Commands::Chat) => {
            run_repl(&args, &config).await?;
        }
        Some(Commands::Doctor) => {
            run_doctor(&args, config).await;
        }
        Some(Commands::Config) => {
            show_config(&args, &config)?;
        }
        None => {
            if let Some(question) = &args.question {
                run_once(&args, &config, question).await?;
            } else {
                println!("mlchat {} - machine-learning Q&A over a book index", env!("CARGO_PKG_VERSION"));
                println!("\nUsage:");
                println!("  mlchat \"<question>\"     Answer one question and exit");
                println!("  mlchat chat             Interactive chat");
                println!("  mlchat doctor           Check API key, model and index");
                println!("  mlchat config           Show effective configuration");
                println!("\nExample:");
                println!("  mlchat \"What is the bias/variance trade-off?\"");
                println!();
            }
        }
    }

    Ok(())
}

/// Wire the process-wide collaborators into a pipeline.
///
/// A store that cannot be opened does not stop the program: every turn
/// then reports the index error instead.
fn build_pipeline(args: &Args, config: &Config) -> Result<QueryPipeline> {
    let completion = config
        .completion_client(args.api_key.clone())
        .context("Failed to create completion client")?;

    if !completion.has_api_key() {
        tracing::warn!("no API key configured; answers will report the missing key");
    }

    let index: Arc<dyn VectorIndex> = match QdrantIndex::open(config.qdrant()) {
        Ok(index) => Arc::new(index),
        Err(e) => {
            tracing::warn!(error = %e, "vector index unavailable; continuing without retrieval");
            Arc::new(UnavailableIndex::from_error(e))
        }
    };

    Ok(QueryPipeline::with_config(index, Arc::new(completion), config.pipeline()))
}

/// Answer a single question and exit non-zero if the turn failed
async fn run_once(args: &Args, config: &Config, question: &str) -> Result<()> {
    let verbosity = args.verbosity();
    let pipeline = build_pipeline(args, config)?;
    let mut state = ConversationState::new(config.session.system_instruction.clone());

    let mut display = if verbosity.show_progress() {
        DisplayManager::new()
    } else {
        DisplayManager::quiet()
    };

    let _spinner = display.start_thinking();
    let outcome = pipeline.handle_user_turn(&mut state, question).await;
    display.finish_current();

    if let Some(reply) = outcome.reply() {
        println!("{}", reply.content());
    }

    if matches!(verbosity, Verbosity::Verbose | Verbosity::VeryVerbose) {
        eprintln!("{}", outcome.summary().dimmed());
    }

    if outcome.is_failure() {
        std::process::exit(1);
    }

    Ok(())
}

async fn run_repl(args: &Args, config: &Config) -> Result<()> {
    let pipeline = build_pipeline(args, config)?;
    let verbosity = args.verbosity();

    let repl_config = ReplConfig {
        history_file: config.history_path(),
        show_progress: verbosity.show_progress(),
        verbose: matches!(verbosity, Verbosity::Verbose | Verbosity::VeryVerbose),
        system_instruction: config.session.system_instruction.clone(),
    };

    let mut session = ReplSession::new(pipeline, repl_config)?;
    session.show_welcome(env!("CARGO_PKG_VERSION"));

    if !args.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
        session.display().show_warning(&format!(
            "{} is not set; every answer will report the missing key",
            API_KEY_ENV
        ));
    }
    session.run().await
}

async fn run_doctor(args: &Args, config: Config) {
    let doctor = Doctor::new(config, args.api_key.clone());

    let report = doctor.run_checks().await;
    report.print();

    std::process::exit(if report.is_healthy() { 0 } else { 1 });
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    println!("\n{}\n", "mlchat Configuration".bold().cyan());

    let source = match args.config.as_ref() {
        Some(path) => path.display().to_string(),
        None => match Config::default_path() {
            Some(path) if path.exists() => path.display().to_string(),
            _ => "built-in defaults".to_string(),
        },
    };
    println!("Source: {}", source);

    let api_key = match args.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => "set (hidden)",
        _ => "not set",
    };
    println!("API key: {}", api_key);
    println!("Verbosity: {}\n", args.verbosity().as_str());

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);

    Ok(())
}
