// Sentibot - emotion-aware chatbot
// Main entry point

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

use sentibot::chat::ChatEngine;
use sentibot::cli::{run_single_turn, Renderer, Repl};
use sentibot::config::{load_config, AppSettings, Config, ConfigPaths};
use sentibot::emotion::{normalize_text, EmotionCategory};
use sentibot::errors::{bind_failed_error, describe_config_error};
use sentibot::server::ChatServer;

#[derive(Parser, Debug)]
#[command(name = "sentibot")]
#[command(about = "Emotion-aware empathetic chatbot", version)]
struct Args {
    /// Config file (default: ~/.sentibot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Secrets file (default: ~/.sentibot/secrets.toml)
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default)
    Chat,
    /// Send a single message and print the reply
    Query {
        text: String,
        /// Print the full turn outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify a message without replying
    Classify {
        text: String,
        #[arg(long)]
        json: bool,
        /// Show per-category scores and normalized text
        #[arg(long)]
        verbose: bool,
    },
    /// Run the HTTP API server
    Serve {
        /// Bind address (default from config: 127.0.0.1:8501)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_filter = init_tracing();

    let mut paths = ConfigPaths::default_locations();
    if let Some(path) = &args.config {
        paths = paths.with_config_file(path.clone());
    }
    if let Some(path) = &args.secrets {
        paths = paths.with_secrets_file(path.clone());
    }

    let config = match load_config(&paths) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", describe_config_error(&e));
            std::process::exit(1);
        }
    };

    log_filter.apply_settings(&config.app);

    let color = !args.no_color
        && io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();
    let renderer = Renderer::new(color);

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(&config, renderer).await,
        Command::Query { text, json } => run_query(&config, renderer, &text, json).await,
        Command::Classify {
            text,
            json,
            verbose,
        } => run_classify(&config, renderer, &text, json, verbose),
        Command::Serve { bind } => run_serve(config, bind).await,
    }
}

/// Installed log filter; the configured level is applied once config has loaded
struct TracingHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl TracingHandle {
    /// RUST_LOG wins over the configured level
    fn apply_settings(&self, app: &AppSettings) {
        if self.from_env {
            return;
        }
        if let Err(e) = self.filter.reload(EnvFilter::new(default_directive(app))) {
            tracing::warn!(error = %e, "Failed to apply configured log level");
        }
    }
}

/// Initialize tracing to stderr at `info` until the configured level is known
fn init_tracing() -> TracingHandle {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Bridge log crate → tracing (for dependencies using log crate)
    tracing_log::LogTracer::init().ok();

    TracingHandle {
        filter: handle,
        from_env,
    }
}

/// `app.debug` raises the default to debug
fn default_directive(app: &AppSettings) -> &str {
    if app.debug {
        "debug"
    } else {
        app.log_level.as_str()
    }
}

async fn run_chat(config: &Config, renderer: Renderer) -> Result<()> {
    let engine = ChatEngine::from_config(config)?;
    Repl::new(engine, renderer).run().await
}

async fn run_query(config: &Config, renderer: Renderer, text: &str, json: bool) -> Result<()> {
    let engine = ChatEngine::from_config(config)?;
    let outcome = run_single_turn(&engine, text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", renderer.user_line(text, &outcome.classification));
        println!("{}", renderer.bot_line(&outcome.reply.text));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ClassifyOutput {
    category: EmotionCategory,
    id: u8,
    label: &'static str,
    emoji: &'static str,
    color: &'static str,
    confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scores: Option<Vec<(EmotionCategory, usize)>>,
}

fn run_classify(config: &Config, renderer: Renderer, text: &str, json: bool, verbose: bool) -> Result<()> {
    let engine = ChatEngine::from_config(config)?;
    let result = engine.classify(text);
    let breakdown = engine.classifier().score_breakdown(text);
    let category = result.category;

    if json {
        let output = ClassifyOutput {
            category,
            id: category.id(),
            label: category.label(),
            emoji: category.emoji(),
            color: category.color(),
            confidence: result.confidence,
            normalized: verbose.then(|| normalize_text(text)),
            scores: verbose.then(|| breakdown.scores.clone()),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", renderer.classification(&result));
    if verbose {
        println!("\nScores:\n{}", renderer.breakdown(&breakdown));
        println!("\nNormalized: {}", normalize_text(text));
    }
    Ok(())
}

async fn run_serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    let address = config.server.bind_address.clone();

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow!(bind_failed_error(&address, e)))?;

    let engine = ChatEngine::from_config(&config)?;
    ChatServer::new(config, engine).serve_on(listener).await
}
