//! Blocking driver against the scripted service, on a manual clock.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use common::fake_service::{failed_job, job, FakeService, ARTIFACT, JOB_ID};
use tempfile::{tempdir, TempDir};
use vgen_core::clock::ManualClock;
use vgen_core::control::AbortToken;
use vgen_core::job::{FrameSize, JobRequest, JobStatus, Model, PreconditionError, Seconds};
use vgen_core::workflow::{run_batch, Completion, StageName, StatusReport, WorkflowError};

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn request() -> JobRequest {
    JobRequest::new("a red fox in snow", Model::Sora2, Seconds::Four, FrameSize::default()).unwrap()
}

struct Run {
    outcome: Result<Completion, WorkflowError>,
    sleeps: Vec<Duration>,
    reports: Vec<StatusReport>,
    path: PathBuf,
    _dir: TempDir,
}

fn run(service: &FakeService, abort: &AbortToken) -> Run {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out/sora_video_20250101_000000.mp4");
    let clock = ManualClock::new();
    let mut reports = Vec::new();
    let outcome = run_batch(
        service,
        &clock,
        abort,
        request(),
        path.clone(),
        &mut |r: &StatusReport| reports.push(r.clone()),
    );
    Run {
        outcome,
        sleeps: clock.sleeps(),
        reports,
        path,
        _dir: dir,
    }
}

#[test]
fn invalid_duration_is_rejected_before_any_call() {
    for bad in ["0", "5", "6", "10", "16", "4.0"] {
        assert!(
            matches!(
                JobRequest::parse("a cat", "sora-2", bad, "1280x720"),
                Err(PreconditionError::Duration(_))
            ),
            "{bad}"
        );
    }
}

#[test]
fn happy_path_downloads_and_cleans_up_once() {
    let service = FakeService::new().statuses(vec![
        Ok(job(JobStatus::Queued, 0)),
        Ok(job(JobStatus::InProgress, 40)),
        Ok(job(JobStatus::Completed, 100)),
    ]);
    let r = run(&service, &AbortToken::new());

    let done = r.outcome.unwrap();
    assert_eq!(done.job_id.as_str(), JOB_ID);
    assert_eq!(done.path, r.path);
    assert_eq!(done.bytes, ARTIFACT.len() as u64);
    assert_eq!(done.cleanup_warning, None);
    assert_eq!(std::fs::read(&r.path).unwrap(), ARTIFACT);
    assert_eq!(service.calls(), (1, 3, 1, 1));
    assert_eq!(r.sleeps, vec![secs(10), secs(10)]);

    let stages: Vec<&str> = r.reports.iter().map(|r| r.stage).collect();
    for expected in ["submitting", "polling", "downloading", "cleaning up", "completed"] {
        assert!(stages.contains(&expected), "missing {expected} in {stages:?}");
    }
    assert!(r.reports.iter().any(|r| r.progress == 40 && r.status.as_deref() == Some("in_progress")));
    assert_eq!(r.reports.last().unwrap().artifact.as_deref(), Some(r.path.as_path()));
}

#[test]
fn client_error_on_submit_is_not_retried() {
    let service = FakeService::new().creates(vec![Err((400, "Invalid size"))]);
    let r = run(&service, &AbortToken::new());
    assert_eq!(
        r.outcome.unwrap_err(),
        WorkflowError::Rejected {
            stage: StageName::Submit,
            status: Some(400),
            message: "Invalid size".into(),
        }
    );
    assert_eq!(service.calls(), (1, 0, 0, 0));
    assert!(r.sleeps.is_empty());
}

#[test]
fn size_mismatch_rejection_carries_hint() {
    let service = FakeService::new()
        .creates(vec![Err((400, "Inpaint image must match the requested width and height"))]);
    let r = run(&service, &AbortToken::new());
    let message = r.outcome.unwrap_err().to_string();
    assert!(message.contains("Hint:"), "{message}");
    assert!(message.contains("1280x720"), "{message}");
}

#[test]
fn server_errors_back_off_two_then_four_seconds() {
    let service = FakeService::new()
        .creates(vec![Err((503, "overloaded")), Err((502, "bad gateway")), Ok(JobStatus::Queued)])
        .statuses(vec![Ok(job(JobStatus::Completed, 100))]);
    let r = run(&service, &AbortToken::new());
    assert!(r.outcome.is_ok(), "{:?}", r.outcome);
    assert_eq!(service.create_calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(r.sleeps, vec![secs(2), secs(4)]);
}

#[test]
fn submission_gives_up_after_three_attempts() {
    let service = FakeService::new().creates(vec![
        Err((500, "boom")),
        Err((500, "boom")),
        Err((503, "still down")),
    ]);
    let r = run(&service, &AbortToken::new());
    match r.outcome.unwrap_err() {
        WorkflowError::Exhausted { stage, attempts, cause } => {
            assert_eq!(stage, StageName::Submit);
            assert_eq!(attempts, 3);
            assert!(cause.contains("still down"), "{cause}");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(service.calls(), (3, 0, 0, 0));
    assert_eq!(r.sleeps, vec![secs(2), secs(4)]);
}

#[test]
fn poll_interval_slows_after_two_minutes() {
    let mut statuses: Vec<_> = (0..14).map(|_| Ok(job(JobStatus::InProgress, 10))).collect();
    statuses.push(Ok(job(JobStatus::Completed, 100)));
    let service = FakeService::new().statuses(statuses);
    let r = run(&service, &AbortToken::new());
    assert!(r.outcome.is_ok());

    let mut expected = vec![secs(10); 12];
    expected.extend([secs(30), secs(30)]);
    assert_eq!(r.sleeps, expected);
    assert_eq!(service.calls(), (1, 15, 1, 1));
}

#[test]
fn polling_times_out_after_two_hundred_queries() {
    let service = FakeService::new();
    let r = run(&service, &AbortToken::new());
    assert_eq!(
        r.outcome.unwrap_err(),
        WorkflowError::TimedOut {
            attempts: 200,
            elapsed_secs: 12 * 10 + 187 * 30,
        }
    );
    assert_eq!(service.calls(), (1, 200, 0, 0));
    assert_eq!(r.sleeps.len(), 199);
}

#[test]
fn failed_job_surfaces_its_message() {
    let service = FakeService::new().statuses(vec![
        Ok(job(JobStatus::InProgress, 5)),
        Ok(failed_job("moderation blocked")),
    ]);
    let r = run(&service, &AbortToken::new());
    assert_eq!(
        r.outcome.unwrap_err().to_string(),
        "video generation failed: moderation blocked"
    );
    assert_eq!(service.calls(), (1, 2, 0, 0));
}

#[test]
fn status_transport_failure_is_not_retried() {
    let service = FakeService::new().statuses(vec![Err((500, "oops"))]);
    let r = run(&service, &AbortToken::new());
    assert!(matches!(
        r.outcome.unwrap_err(),
        WorkflowError::Remote { stage: StageName::Poll, attempt: 1, .. }
    ));
    assert_eq!(service.calls(), (1, 1, 0, 0));
}

#[test]
fn download_retries_until_content_is_ready() {
    let mut downloads: Vec<_> = (0..11).map(|_| Err((404, "not found"))).collect();
    downloads.push(Ok(()));
    let service = FakeService::new()
        .statuses(vec![Ok(job(JobStatus::Completed, 100))])
        .downloads(downloads);
    let r = run(&service, &AbortToken::new());
    assert!(r.outcome.is_ok(), "{:?}", r.outcome);
    assert_eq!(service.calls(), (1, 1, 12, 1));
    assert_eq!(r.sleeps, vec![secs(10); 11]);
}

#[test]
fn not_ready_message_without_404_is_also_retried() {
    let service = FakeService::new()
        .statuses(vec![Ok(job(JobStatus::Completed, 100))])
        .downloads(vec![Err((400, "Video content is not ready yet")), Ok(())]);
    let r = run(&service, &AbortToken::new());
    assert!(r.outcome.is_ok(), "{:?}", r.outcome);
    assert_eq!(service.calls(), (1, 1, 2, 1));
}

#[test]
fn download_gives_up_after_twelve_attempts() {
    let service = FakeService::new()
        .statuses(vec![Ok(job(JobStatus::Completed, 100))])
        .downloads((0..12).map(|_| Err((404, "not found"))).collect());
    let r = run(&service, &AbortToken::new());
    match r.outcome.unwrap_err() {
        e @ WorkflowError::ContentUnavailable { .. } => {
            assert_eq!(
                e,
                WorkflowError::ContentUnavailable {
                    attempts: 12,
                    window_secs: 120,
                    cause: "API error (404): not found".into(),
                }
            );
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(service.calls(), (1, 1, 12, 0));
    assert_eq!(r.sleeps.len(), 11);
    assert!(!r.path.exists());
}

#[test]
fn download_server_error_is_terminal() {
    let service = FakeService::new()
        .statuses(vec![Ok(job(JobStatus::Completed, 100))])
        .downloads(vec![Err((500, "storage offline"))]);
    let r = run(&service, &AbortToken::new());
    assert!(matches!(
        r.outcome.unwrap_err(),
        WorkflowError::Remote { stage: StageName::Retrieve, attempt: 1, .. }
    ));
    assert_eq!(service.calls(), (1, 1, 1, 0));
}

#[test]
fn cleanup_failure_is_only_a_warning() {
    let service = FakeService::new()
        .statuses(vec![Ok(job(JobStatus::Completed, 100))])
        .deletes(vec![Err((500, "delete failed"))]);
    let r = run(&service, &AbortToken::new());
    let done = r.outcome.unwrap();
    let warning = done.cleanup_warning.unwrap();
    assert!(warning.contains("delete failed"), "{warning}");
    assert!(r.path.exists());
    assert_eq!(service.calls(), (1, 1, 1, 1));
    assert_eq!(r.reports.last().unwrap().warning.as_deref(), Some(warning.as_str()));
}

#[test]
fn cancel_between_polls_stops_without_cleanup() {
    let abort = AbortToken::new();
    let service = FakeService::new().abort_after_polls(3, abort.clone());
    let r = run(&service, &abort);
    assert_eq!(r.outcome.unwrap_err(), WorkflowError::Cancelled);
    assert_eq!(service.calls(), (1, 3, 0, 0));
    assert_eq!(r.reports.last().unwrap().stage, "cancelled");
}

#[test]
fn abort_during_successful_download_still_cleans_up() {
    let abort = AbortToken::new();
    let service = FakeService::new()
        .statuses(vec![Ok(job(JobStatus::Completed, 100))])
        .abort_on_download(abort.clone());
    let r = run(&service, &abort);
    let done = r.outcome.unwrap();
    assert_eq!(done.path, r.path);
    assert_eq!(done.bytes, ARTIFACT.len() as u64);
    assert_eq!(done.cleanup_warning, None);
    assert!(r.path.exists());
    assert_eq!(service.calls(), (1, 1, 1, 1));
    assert_eq!(r.reports.last().unwrap().stage, "completed");
}

#[test]
fn abort_during_unready_download_stops_without_cleanup() {
    let abort = AbortToken::new();
    let service = FakeService::new()
        .statuses(vec![Ok(job(JobStatus::Completed, 100))])
        .downloads(vec![Err((404, "video is not ready yet"))])
        .abort_on_download(abort.clone());
    let r = run(&service, &abort);
    assert_eq!(r.outcome.unwrap_err(), WorkflowError::Cancelled);
    assert!(!r.path.exists());
    assert_eq!(service.calls(), (1, 1, 1, 0));
}

#[test]
fn abort_before_start_makes_no_remote_call() {
    let abort = AbortToken::new();
    abort.raise();
    let service = FakeService::new();
    let r = run(&service, &abort);
    assert_eq!(r.outcome.unwrap_err(), WorkflowError::Cancelled);
    assert_eq!(service.calls(), (0, 0, 0, 0));
}

#[test]
fn elapsed_time_is_reported_from_the_clock() {
    let service = FakeService::new().statuses(vec![
        Ok(job(JobStatus::InProgress, 20)),
        Ok(job(JobStatus::InProgress, 60)),
        Ok(job(JobStatus::Completed, 100)),
    ]);
    let r = run(&service, &AbortToken::new());
    assert!(r.outcome.is_ok());
    assert_eq!(r.reports.last().unwrap().elapsed_secs, 20);
}
