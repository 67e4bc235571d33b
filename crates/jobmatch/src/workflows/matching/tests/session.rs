use super::common::*;
use crate::workflows::matching::domain::JobId;
use crate::workflows::matching::session::{SessionPhase, SwipeSession};

fn job_id(raw: &str) -> JobId {
    JobId(raw.to_string())
}

#[test]
fn new_sessions_start_loading() {
    let session = SwipeSession::new();
    assert_eq!(session.phase(), SessionPhase::Loading);
    assert!(session.presented().is_none());
}

#[test]
fn loading_an_empty_batch_lands_in_empty() {
    let mut session = SwipeSession::new();
    session.load(batch_for("ana", Vec::new()));
    assert_eq!(session.phase(), SessionPhase::Empty);
    assert!(session.presented().is_none());
}

#[test]
fn skip_wraps_the_cursor_back_to_the_first_slot() {
    let mut session = SwipeSession::new();
    session.load(batch_for(
        "ana",
        vec![
            job("job-1", "Backend Engineer", &["rust"], 1),
            job("job-2", "Platform Engineer", &["go"], 2),
        ],
    ));

    assert_eq!(session.cursor_slot().map(|entry| &entry.job.id), Some(&job_id("job-1")));

    session.skip();
    assert_eq!(session.cursor_slot().map(|entry| &entry.job.id), Some(&job_id("job-2")));

    session.skip();
    // Positional wrap-around: two skips on a two-slot queue return the
    // cursor to the first slot.
    assert_eq!(session.cursor_slot().map(|entry| &entry.job.id), Some(&job_id("job-1")));
}

#[test]
fn skipped_jobs_are_never_presented_again() {
    let mut session = SwipeSession::new();
    session.load(batch_for(
        "ana",
        vec![
            job("job-1", "Backend Engineer", &["rust"], 1),
            job("job-2", "Platform Engineer", &["go"], 2),
        ],
    ));

    assert_eq!(session.skip(), Some(job_id("job-1")));
    assert_eq!(session.presented().map(|entry| &entry.job.id), Some(&job_id("job-2")));

    assert_eq!(session.skip(), Some(job_id("job-2")));
    assert!(session.presented().is_none());
    assert_eq!(session.phase(), SessionPhase::Empty);

    // The queue itself was never mutated.
    assert_eq!(session.queue_len(), 2);
    assert_eq!(session.skipped_count(), 2);
    assert_eq!(session.remaining(), 0);
    assert_eq!(session.skip(), None);
}

#[test]
fn presentation_skips_suppressed_slots_after_a_wrap() {
    let mut session = SwipeSession::new();
    session.load(batch_for(
        "ana",
        vec![
            job("job-1", "Backend Engineer", &["rust"], 1),
            job("job-2", "Platform Engineer", &["go"], 2),
            job("job-3", "Data Engineer", &["sql"], 3),
        ],
    ));

    session.skip();
    assert_eq!(session.commit_shortlist(), Some(job_id("job-2")));

    // Only job-3 is left; after it the session is exhausted.
    assert_eq!(session.presented().map(|entry| &entry.job.id), Some(&job_id("job-3")));
    session.skip();
    assert_eq!(session.phase(), SessionPhase::Empty);
}

#[test]
fn failed_fetches_are_distinct_from_empty() {
    let mut session = SwipeSession::new();
    session.fail("recommendation fetch failed");

    assert_eq!(session.phase(), SessionPhase::Failed);
    assert_eq!(session.failure_message(), Some("recommendation fetch failed"));
    assert_ne!(session.phase(), SessionPhase::Empty);
    assert_eq!(session.skip(), None);
}

#[test]
fn reloading_replaces_a_failed_session() {
    let mut session = SwipeSession::new();
    session.fail("recommendation fetch failed");
    session.load(batch_for(
        "ana",
        vec![job("job-1", "Backend Engineer", &["rust"], 1)],
    ));

    assert_eq!(session.phase(), SessionPhase::Ready);
    assert!(session.failure_message().is_none());
}
