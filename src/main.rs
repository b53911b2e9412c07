//! Application entry point — speaking-tutor CLI.
//!
//! # Startup sequence
//!
//! 1. Parse arguments.
//! 2. Initialise logging.
//! 3. Load [`AppConfig`] (defaults on first run), apply env overrides.
//! 4. Build the request body from flags, a file, or stdin.
//! 5. Create the [`tokio`] runtime and run one assessment; Ctrl-C cancels
//!    the in-flight model call.
//! 6. Print the reply as pretty JSON; exit non-zero unless it is a 200.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use speaking_tutor::{
    config::{AppConfig, AppPaths},
    pipeline::{handle_request, Assessor},
};

/// Assess a spoken sentence against its target
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read the JSON request from this file instead of stdin
    #[arg(short, long, conflicts_with_all = ["target", "transcript"])]
    request: Option<PathBuf>,

    /// Target sentence
    #[arg(short, long, requires = "transcript")]
    target: Option<String>,

    /// What the learner said (speech-to-text output)
    #[arg(short = 's', long, requires = "target")]
    transcript: Option<String>,

    /// Write the effective settings file and exit
    #[arg(long)]
    init_config: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };
    Ok(config)
}

fn request_body(args: &Args) -> Result<String> {
    if let (Some(target), Some(transcript)) = (&args.target, &args.transcript) {
        let body = serde_json::json!({
            "targetText": target,
            "transcriptText": transcript,
        });
        return Ok(body.to_string());
    }

    if let Some(path) = &args.request {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request from {}", path.display()));
    }

    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .context("failed to read request from stdin")?;
    Ok(body)
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::debug!("speaking-tutor v{} starting", env!("CARGO_PKG_VERSION"));

    // 2. Configuration
    let mut config = load_config(args.config.as_ref())?;

    if args.init_config {
        match &args.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        let path = args
            .config
            .clone()
            .unwrap_or_else(|| AppPaths::new().settings_file);
        log::info!("Wrote settings to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    // Environment keys are applied after any save so they never hit disk.
    config.apply_env_overrides();

    if config.llm.credential().is_none() {
        log::warn!("No API key configured; feedback will report NOT_CONFIGURED");
    }

    let body = request_body(&args)?;

    // 3. Runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Assess
    let assessor = Assessor::from_config(&config);
    let reply = rt.block_on(async {
        tokio::select! {
            reply = handle_request(&assessor, &body) => Some(reply),
            _ = tokio::signal::ctrl_c() => None,
        }
    });

    let Some(reply) = reply else {
        log::warn!("Interrupted; assessment cancelled");
        return Ok(ExitCode::from(130));
    };

    // 5. Output
    println!("{}", serde_json::to_string_pretty(&reply.body)?);

    if reply.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
