//! `vgen run` – generate one video and block until it is saved.

use anyhow::{Context as _, Result};
use chrono::Local;
use vgen_core::clock::SystemClock;
use vgen_core::control::AbortToken;
use vgen_core::workflow::{run_batch, StatusReport};

use super::{finish, watch_ctrl_c, Context, Plan, ProgressPrinter};
use crate::cli::GenerateArgs;

pub async fn run_batch_generate(ctx: Context, args: &GenerateArgs) -> Result<()> {
    let plan = Plan::resolve(args, &ctx.cfg, false)?;
    let client = ctx.client()?;
    let prompt = plan.prompt().to_string();
    let (request, path) = plan.prepare(Local::now())?;
    println!(
        "Generating a {}s {} video with {}",
        request.seconds(),
        request.size(),
        request.model()
    );

    let abort = AbortToken::new();
    let watcher = watch_ctrl_c(abort.clone());
    let outcome = tokio::task::spawn_blocking(move || {
        let clock = SystemClock::new();
        let mut printer = ProgressPrinter::default();
        run_batch(&client, &clock, &abort, request, path, &mut |report: &StatusReport| {
            if let Some(line) = printer.line(report) {
                println!("{line}");
            }
        })
    })
    .await
    .context("generation task did not complete")?;
    watcher.abort();

    finish(ctx.cfg, &prompt, outcome)
}
