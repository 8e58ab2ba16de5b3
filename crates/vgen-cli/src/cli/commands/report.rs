//! Human-readable progress lines from workflow status reports.

use vgen_core::workflow::StatusReport;

/// One-line description of the current step.
pub fn describe(r: &StatusReport) -> String {
    match r.stage {
        "submitting" => format!("Submitting job (attempt {}/{})", r.attempt, r.max_attempts),
        "polling" => format!(
            "Job {}: {} {}% (check {})",
            r.job_id.as_deref().unwrap_or("?"),
            r.status.as_deref().unwrap_or("pending"),
            r.progress,
            r.attempt
        ),
        "downloading" => format!("Downloading video (attempt {}/{})", r.attempt, r.max_attempts),
        "cleaning up" => "Removing job from service".to_string(),
        "completed" => match &r.artifact {
            Some(path) => format!("Done: {}", path.display()),
            None => "Done".to_string(),
        },
        _ => r.error.clone().unwrap_or_else(|| r.stage.to_string()),
    }
}

/// Status line for the interactive session, redrawn every tick.
pub fn status_line(r: &StatusReport) -> String {
    format!("[{:>4}s] {}", r.elapsed_secs, describe(r))
}

/// Prints a line for the batch run only when something visible changed.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    last: Option<String>,
}

impl ProgressPrinter {
    pub fn line(&mut self, r: &StatusReport) -> Option<String> {
        if r.error.is_some() || r.stage == "completed" {
            return None;
        }
        let text = describe(r);
        if self.last.as_deref() == Some(text.as_str()) {
            return None;
        }
        self.last = Some(text.clone());
        Some(format!("[{:>4}s] {text}", r.elapsed_secs))
    }
}
