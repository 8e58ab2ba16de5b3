//! Resolve generation parameters from flags, config and defaults.

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use vgen_core::config::{expand_home, VgenConfig};
use vgen_core::job::{FrameSize, JobRequest, Model, Seconds};
use vgen_core::reference::ReferenceImage;
use vgen_core::workflow::artifact_path;

use crate::cli::GenerateArgs;

/// A validated generation request and where to put the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub request: JobRequest,
    pub reference: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Plan {
    /// Flag > config > default for each parameter. `reuse_last_prompt` lets
    /// the saved prompt stand in for a missing `--prompt`.
    pub fn resolve(args: &GenerateArgs, cfg: &VgenConfig, reuse_last_prompt: bool) -> Result<Self> {
        let prompt = match (&args.prompt, &cfg.last_prompt) {
            (Some(p), _) => p.clone(),
            (None, Some(last)) if reuse_last_prompt => last.clone(),
            _ => bail!("a prompt is required (--prompt)"),
        };
        let model = pick(&args.model, &cfg.model, Model::default().as_str());
        let duration = pick(&args.duration, &cfg.duration, Seconds::default().as_str());
        let size = pick(&args.size, &cfg.size, FrameSize::default().as_str());
        let request = JobRequest::parse(&prompt, model, duration, size)?;

        let output_dir = match &args.output_dir {
            Some(dir) => expand_home(&dir.to_string_lossy()),
            None => cfg.output_dir(),
        };
        let reference = args.reference.as_deref().map(expand_home);
        Ok(Self {
            request,
            reference,
            output_dir,
        })
    }

    pub fn prompt(&self) -> &str {
        self.request.prompt()
    }

    /// Load the reference image (if any) and name the artifact.
    pub fn prepare(self, now: DateTime<Local>) -> Result<(JobRequest, PathBuf)> {
        let path = artifact_path(&self.output_dir, now);
        let request = match &self.reference {
            Some(reference) => {
                let image = ReferenceImage::load(reference, self.request.size())
                    .with_context(|| format!("prepare reference image {}", reference.display()))?;
                tracing::info!(
                    path = %reference.display(),
                    bytes = image.bytes.len(),
                    size = %self.request.size(),
                    "reference image prepared"
                );
                self.request.with_reference(image)
            }
            None => self.request,
        };
        Ok((request, path))
    }
}

fn pick<'a>(flag: &'a Option<String>, configured: &'a Option<String>, default: &'a str) -> &'a str {
    flag.as_deref()
        .or(configured.as_deref().filter(|v| !v.trim().is_empty()))
        .unwrap_or(default)
}
