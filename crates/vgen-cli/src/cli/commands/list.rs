//! `vgen list` – show recent jobs.

use anyhow::Result;
use chrono::Local;
use vgen_core::api::VideoService;

use super::Context;

pub async fn run_list(ctx: &Context, limit: usize) -> Result<()> {
    let client = ctx.client()?;
    let jobs = tokio::task::spawn_blocking(move || client.list(limit)).await??;
    if jobs.is_empty() {
        println!("No videos on the service.");
        return Ok(());
    }
    println!(
        "{:<40} {:<12} {:>4} {:<11} {:<10} {:>4} {}",
        "ID", "STATUS", "PCT", "MODEL", "SIZE", "SECS", "CREATED"
    );
    for j in jobs {
        let created = j
            .created_at
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:<12} {:>4} {:<11} {:<10} {:>4} {}",
            j.id.as_str(),
            j.status.as_str(),
            j.progress,
            j.model.as_deref().unwrap_or("-"),
            j.size.as_deref().unwrap_or("-"),
            j.seconds.as_deref().unwrap_or("-"),
            created
        );
    }
    Ok(())
}
