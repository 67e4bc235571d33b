use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use super::domain::{ApplicationStatus, Job, JobApplication, JobId, UserId};
use super::engine::{MatchError, RankedJob, RecommendationBatch, RecommendationEngine};
use super::scoring::ScoringConfig;
use super::session::{SessionPhase, SwipeSession};
use super::stores::{
    ApplicationStore, JobCatalog, ShortlistStore, StoreError, UserDirectory, WriteOutcome,
};

/// Facade composing the recommendation engine, the collaborator stores, and
/// the per-user swipe session registry. One interactive session per user.
pub struct MatchingService<C, U, S, A> {
    engine: RecommendationEngine<C, U, S, A>,
    catalog: Arc<C>,
    shortlists: Arc<S>,
    applications: Arc<A>,
    sessions: Mutex<HashMap<UserId, SwipeSession>>,
}

impl<C, U, S, A> MatchingService<C, U, S, A>
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
{
    pub fn new(
        catalog: Arc<C>,
        directory: Arc<U>,
        shortlists: Arc<S>,
        applications: Arc<A>,
        config: ScoringConfig,
    ) -> Self {
        let engine = RecommendationEngine::new(
            Arc::clone(&catalog),
            directory,
            Arc::clone(&shortlists),
            Arc::clone(&applications),
            config,
        );

        Self {
            engine,
            catalog,
            shortlists,
            applications,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<UserId, SwipeSession>> {
        self.sessions.lock().expect("session registry mutex poisoned")
    }

    fn view(user: &UserId, session: &SwipeSession) -> SessionView {
        SessionView {
            user: user.clone(),
            phase: session.phase(),
            presented: session.presented().cloned(),
            queue_length: session.queue_len(),
            skipped: session.skipped_count(),
            remaining: session.remaining(),
            failure: session.failure_message().map(str::to_string),
        }
    }

    /// One-shot ranked batch, independent of any session.
    pub fn recommend(
        &self,
        user: &UserId,
        today: NaiveDate,
    ) -> Result<RecommendationBatch, MatchingServiceError> {
        Ok(self.engine.recommend(user, today)?)
    }

    /// Start (or restart) the swipe session for `user` from a fresh batch.
    ///
    /// An upstream fetch failure parks the session in the `Failed` phase
    /// (distinct from `Empty`) and surfaces the error; an invalid user never
    /// creates a session.
    pub fn start_session(
        &self,
        user: &UserId,
        today: NaiveDate,
    ) -> Result<SessionView, MatchingServiceError> {
        match self.engine.recommend(user, today) {
            Ok(batch) => {
                debug!(user = %user, jobs = batch.len(), "swipe session loaded");
                let mut sessions = self.lock_sessions();
                let session = sessions.entry(user.clone()).or_insert_with(SwipeSession::new);
                session.load(batch);
                Ok(Self::view(user, session))
            }
            Err(err @ MatchError::Upstream(_)) => {
                let mut sessions = self.lock_sessions();
                let session = sessions.entry(user.clone()).or_insert_with(SwipeSession::new);
                session.fail("recommendation fetch failed");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn session_view(&self, user: &UserId) -> Result<SessionView, MatchingServiceError> {
        let sessions = self.lock_sessions();
        let session = sessions
            .get(user)
            .ok_or_else(|| MatchingServiceError::NoSession(user.clone()))?;
        Ok(Self::view(user, session))
    }

    /// Skip the presented job. Valid in `Ready`; a no-op on an exhausted
    /// queue; an error in `Loading`/`Failed`.
    pub fn skip(&self, user: &UserId) -> Result<SessionView, MatchingServiceError> {
        let mut sessions = self.lock_sessions();
        let session = sessions
            .get_mut(user)
            .ok_or_else(|| MatchingServiceError::NoSession(user.clone()))?;

        match session.phase() {
            SessionPhase::Ready => {
                if let Some(id) = session.skip() {
                    debug!(user = %user, job = %id, "job skipped for this session");
                }
                Ok(Self::view(user, session))
            }
            SessionPhase::Empty => Ok(Self::view(user, session)),
            phase => Err(MatchingServiceError::SessionNotReady {
                user: user.clone(),
                phase,
            }),
        }
    }

    /// Shortlist the presented job. The cursor advances only after the store
    /// write succeeds; on failure the job stays presented so the caller can
    /// retry or report.
    pub fn shortlist_presented(&self, user: &UserId) -> Result<SessionView, MatchingServiceError> {
        let mut sessions = self.lock_sessions();
        let session = sessions
            .get_mut(user)
            .ok_or_else(|| MatchingServiceError::NoSession(user.clone()))?;

        let job_id = match session.presented() {
            Some(entry) => entry.job.id.clone(),
            None => {
                return Err(MatchingServiceError::SessionNotReady {
                    user: user.clone(),
                    phase: session.phase(),
                })
            }
        };

        self.shortlists.add(user, &job_id)?;
        session.commit_shortlist();
        debug!(user = %user, job = %job_id, "job shortlisted from swipe session");
        Ok(Self::view(user, session))
    }

    /// Idempotent shortlist add outside any session. The job must exist.
    pub fn add_to_shortlist(
        &self,
        user: &UserId,
        job: &JobId,
    ) -> Result<WriteOutcome, MatchingServiceError> {
        self.catalog
            .fetch(job)?
            .ok_or_else(|| MatchingServiceError::UnknownJob(job.clone()))?;
        Ok(self.shortlists.add(user, job)?)
    }

    /// Idempotent shortlist removal; removing an absent entry is a no-op.
    pub fn remove_from_shortlist(
        &self,
        user: &UserId,
        job: &JobId,
    ) -> Result<WriteOutcome, MatchingServiceError> {
        Ok(self.shortlists.remove(user, job)?)
    }

    /// Resolve the user's shortlist against the catalog. Entries whose job
    /// has since been removed from the catalog are dropped from the view.
    pub fn shortlisted_jobs(&self, user: &UserId) -> Result<Vec<Job>, MatchingServiceError> {
        let mut jobs = Vec::new();
        for id in self.shortlists.jobs(user)? {
            if let Some(job) = self.catalog.fetch(&id)? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    pub fn applications_for(
        &self,
        user: &UserId,
    ) -> Result<Vec<JobApplication>, MatchingServiceError> {
        Ok(self.applications.for_user(user)?)
    }

    /// Submit an application. A duplicate submit while an active application
    /// holds the (user, job) slot is an idempotent no-op, not an error.
    pub fn submit_application(
        &self,
        user: &UserId,
        job: &JobId,
        today: NaiveDate,
        cover_letter: Option<String>,
        answers: Vec<String>,
    ) -> Result<WriteOutcome, MatchingServiceError> {
        let posting = self
            .catalog
            .fetch(job)?
            .ok_or_else(|| MatchingServiceError::UnknownJob(job.clone()))?;

        if !posting.accepts_applications_on(today) {
            return Err(MatchingServiceError::ApplicationsClosed {
                job: job.clone(),
                deadline: posting.deadline.unwrap_or(today),
            });
        }

        let application = JobApplication {
            job: job.clone(),
            user: user.clone(),
            status: ApplicationStatus::Submitted,
            cover_letter,
            answers,
            submitted_at: Utc::now(),
        };

        Ok(self.applications.submit(application)?)
    }

    /// Withdraw the active application for (user, job); a no-op when none
    /// exists.
    pub fn withdraw_application(
        &self,
        user: &UserId,
        job: &JobId,
    ) -> Result<WriteOutcome, MatchingServiceError> {
        Ok(self.applications.withdraw(user, job)?)
    }
}

/// Sanitized snapshot of a user's swipe session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub user: UserId,
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presented: Option<RankedJob>,
    pub queue_length: usize,
    pub skipped: usize,
    pub remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Error raised by the matching service facade.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no swipe session exists for user {0}")]
    NoSession(UserId),
    #[error("swipe session for user {user} is {phase} and cannot accept swipes")]
    SessionNotReady { user: UserId, phase: SessionPhase },
    #[error("job {0} does not exist")]
    UnknownJob(JobId),
    #[error("applications for job {job} closed on {deadline}")]
    ApplicationsClosed { job: JobId, deadline: NaiveDate },
}
