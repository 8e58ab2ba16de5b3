//! CLI command handlers. Each command is in its own file.

mod generate;
mod list;
mod purge;
mod report;
mod run;
mod session;

pub use generate::Plan;
pub use list::run_list;
pub use purge::run_purge;
pub use report::{describe, status_line, ProgressPrinter};
pub use run::run_batch_generate;
pub use session::run_session;

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use vgen_core::api::{SoraClient, DEFAULT_API_BASE};
use vgen_core::config::{self, VgenConfig, API_KEY_ENV};
use vgen_core::control::AbortToken;
use vgen_core::trace::{TraceRing, TraceSink};
use vgen_core::workflow::{Completion, WorkflowError};

/// Loaded configuration plus the trace sink for this invocation.
pub struct Context {
    pub cfg: VgenConfig,
    pub trace: Arc<dyn TraceSink>,
}

impl Context {
    /// API client; fails before any request when no key is configured.
    pub fn client(&self) -> Result<SoraClient> {
        let key = self.cfg.api_key().ok_or_else(|| {
            let path = config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "config.toml".to_string());
            anyhow!("no API key: set {API_KEY_ENV} or openai_api_key in {path}")
        })?;
        let base = self.cfg.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        SoraClient::with_base(key, base, Arc::clone(&self.trace))
    }
}

/// Raise `abort` on Ctrl-C. Abort the returned handle once the workflow ends.
fn watch_ctrl_c(abort: AbortToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling...");
            abort.raise();
        }
    })
}

/// Report the outcome and remember the prompt after a successful run.
fn finish(
    mut cfg: VgenConfig,
    prompt: &str,
    outcome: Result<Completion, WorkflowError>,
) -> Result<()> {
    let done = outcome?;
    println!("Video saved to {} ({} bytes)", done.path.display(), done.bytes);
    if let Some(warning) = &done.cleanup_warning {
        eprintln!("Warning: {warning}");
    }
    cfg.last_prompt = Some(prompt.to_string());
    if let Err(e) = cfg.save() {
        tracing::warn!(error = %e, "could not save last prompt");
    }
    Ok(())
}

/// Print recorded API traffic, oldest first.
pub fn dump_trace(ring: &TraceRing) {
    if ring.is_empty() {
        return;
    }
    eprintln!("--- API trace ({} entries) ---", ring.len());
    for entry in ring.entries() {
        eprintln!("{entry}\n");
    }
}
