//! CLI for vgen.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use vgen_core::config;
use vgen_core::trace::{NullTrace, TraceRing, TraceSink};

use commands::{run_batch_generate, run_list, run_purge, run_session, Context};

/// Top-level CLI for vgen.
#[derive(Debug, Parser)]
#[command(name = "vgen")]
#[command(about = "vgen: generate videos with the OpenAI Sora API", long_about = None)]
pub struct Cli {
    /// Record API requests and responses and print them to stderr afterwards.
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Generation parameters. Unset flags fall back to config, then defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct GenerateArgs {
    /// Text prompt describing the video.
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Model: sora-2 or sora-2-pro (aliases: sora, sora-pro).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Reference image; resized and cropped to the video size before upload.
    #[arg(short, long, value_name = "PATH")]
    pub reference: Option<String>,

    /// Duration in seconds: 4, 8 or 12.
    #[arg(short = 't', long = "duration", value_name = "SECONDS")]
    pub duration: Option<String>,

    /// Frame size: 1280x720, 720x1280, 1792x1024 or 1024x1792.
    #[arg(short, long)]
    pub size: Option<String>,

    /// Directory for the generated video (default: desktop).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate one video, blocking until it is saved.
    Run(GenerateArgs),

    /// Generate with a live status line; Ctrl-C cancels. Reuses the last
    /// prompt when none is given.
    Session(GenerateArgs),

    /// List recent jobs on the service.
    List {
        /// Number of jobs to show.
        #[arg(long, default_value = "10", value_name = "N")]
        limit: usize,
    },

    /// Delete recent jobs from the service.
    Purge {
        /// Number of recent jobs to delete.
        #[arg(long, default_value = "10", value_name = "N")]
        limit: usize,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!(
            model = ?cfg.model,
            output_dir = ?cfg.output_dir,
            api_base = ?cfg.api_base,
            "loaded config"
        );

        let ring = cli.debug.then(|| Arc::new(TraceRing::default()));
        let trace: Arc<dyn TraceSink> = match &ring {
            Some(ring) => Arc::clone(ring) as Arc<dyn TraceSink>,
            None => Arc::new(NullTrace),
        };
        let ctx = Context { cfg, trace };

        let result = match cli.command {
            CliCommand::Run(args) => run_batch_generate(ctx, &args).await,
            CliCommand::Session(args) => run_session(ctx, &args).await,
            CliCommand::List { limit } => run_list(&ctx, limit).await,
            CliCommand::Purge { limit } => run_purge(&ctx, limit).await,
        };

        if let Some(ring) = ring {
            commands::dump_trace(&ring);
        }
        result
    }
}

#[cfg(test)]
mod tests;
