//! `vgen purge` – delete recent jobs from the service.

use anyhow::Result;
use vgen_core::api::VideoService;

use super::Context;

pub async fn run_purge(ctx: &Context, limit: usize) -> Result<()> {
    let client = ctx.client()?;
    let (deleted, total) = tokio::task::spawn_blocking(move || -> Result<(usize, usize)> {
        let jobs = client.list(limit)?;
        let mut deleted = 0;
        for job in &jobs {
            match client.delete(&job.id) {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!(job_id = %job.id, error = %e, "delete failed"),
            }
        }
        Ok((deleted, jobs.len()))
    })
    .await??;
    println!("Deleted {deleted} of {total} video(s).");
    Ok(())
}
