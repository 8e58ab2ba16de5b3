//! `vgen session` – generate with a live status line.

use anyhow::Result;
use chrono::Local;
use std::io::{self, Write};
use std::sync::Arc;
use vgen_core::api::VideoService;
use vgen_core::control::AbortToken;
use vgen_core::workflow::run_interactive;

use super::{finish, status_line, watch_ctrl_c, Context, Plan};
use crate::cli::GenerateArgs;

pub async fn run_session(ctx: Context, args: &GenerateArgs) -> Result<()> {
    let plan = Plan::resolve(args, &ctx.cfg, true)?;
    let client: Arc<dyn VideoService> = Arc::new(ctx.client()?);
    let prompt = plan.prompt().to_string();
    let (request, path) = plan.prepare(Local::now())?;
    println!("Prompt: {prompt}");
    println!(
        "Model {} | {}s | {} | saving to {}",
        request.model(),
        request.seconds(),
        request.size(),
        path.display()
    );
    println!("Press Ctrl-C to cancel.");

    let abort = AbortToken::new();
    let watcher = watch_ctrl_c(abort.clone());
    let mut stdout = io::stdout();
    let outcome = run_interactive(client, request, path, abort, |report| {
        let _ = write!(stdout, "\r{:<78}", status_line(report));
        let _ = stdout.flush();
    })
    .await;
    watcher.abort();
    println!();

    finish(ctx.cfg, &prompt, outcome)
}
