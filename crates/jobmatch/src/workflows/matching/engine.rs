use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Job, JobId, Role, UserId};
use super::scoring::{score_job, ScoreComponent, ScoringConfig};
use super::stores::{ApplicationStore, JobCatalog, ShortlistStore, StoreError, UserDirectory};

/// Produces the ranked candidate pool for a job seeker.
///
/// Read-only over its collaborators; failures surface to the caller without
/// internal retries.
pub struct RecommendationEngine<C, U, S, A> {
    catalog: Arc<C>,
    directory: Arc<U>,
    shortlists: Arc<S>,
    applications: Arc<A>,
    config: ScoringConfig,
}

impl<C, U, S, A> RecommendationEngine<C, U, S, A>
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
        Self {
            catalog,
            directory,
            shortlists,
            applications,
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Rank every open posting the seeker has not already shortlisted,
    /// applied to, or missed the deadline for. An empty batch is a valid
    /// outcome, distinct from every error.
    pub fn recommend(
        &self,
        user_id: &UserId,
        today: NaiveDate,
    ) -> Result<RecommendationBatch, MatchError> {
        let account = self
            .directory
            .fetch(user_id)?
            .ok_or_else(|| MatchError::UnknownUser(user_id.clone()))?;

        if account.role != Role::JobSeeker {
            return Err(MatchError::NotJobSeeker {
                user: user_id.clone(),
                role: account.role,
            });
        }

        let shortlisted: HashSet<JobId> = self.shortlists.jobs(user_id)?.into_iter().collect();
        let applied: HashSet<JobId> = self
            .applications
            .for_user(user_id)?
            .into_iter()
            .filter(|application| application.status.is_active())
            .map(|application| application.job)
            .collect();

        let mut seen = HashSet::new();
        let mut ranked = Vec::new();

        for job in self.catalog.all()? {
            if !seen.insert(job.id.clone()) {
                continue;
            }
            if shortlisted.contains(&job.id) || applied.contains(&job.id) {
                continue;
            }
            if !job.accepts_applications_on(today) {
                continue;
            }

            let (components, score) = score_job(&account, &job, &self.config, today);
            ranked.push(RankedJob {
                job,
                score,
                components,
            });
        }

        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.job.created_at.cmp(&a.job.created_at))
                .then_with(|| a.job.id.cmp(&b.job.id))
        });

        Ok(RecommendationBatch {
            user: user_id.clone(),
            jobs: ranked,
        })
    }
}

/// One scored entry in a recommendation batch.
#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    pub job: Job,
    pub score: i16,
    pub components: Vec<ScoreComponent>,
}

/// Ordered, de-duplicated candidate jobs for one seeker. Session-scoped and
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationBatch {
    pub user: UserId,
    pub jobs: Vec<RankedJob>,
}

impl RecommendationBatch {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn job_ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(|entry| entry.job.id.clone()).collect()
    }
}

/// Error raised while producing recommendations.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("user {0} does not exist")]
    UnknownUser(UserId),
    #[error("user {user} has role {role}; recommendations are for job seekers")]
    NotJobSeeker { user: UserId, role: Role },
    #[error(transparent)]
    Upstream(#[from] StoreError),
}
