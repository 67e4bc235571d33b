use serde::Serialize;

use super::domain::{Job, JobApplication, JobId, UserAccount, UserId};

/// Read seam over the job catalog collaborator.
pub trait JobCatalog: Send + Sync {
    fn all(&self) -> Result<Vec<Job>, StoreError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
}

/// Read seam over the account directory owned by the identity provider.
pub trait UserDirectory: Send + Sync {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError>;
}

/// Per-user shortlist sets. Writes must be atomic upserts keyed by
/// (user, job): adding a present job or removing an absent one reports
/// [`WriteOutcome::NoOp`] instead of failing, so retried requests stay
/// idempotent.
pub trait ShortlistStore: Send + Sync {
    fn jobs(&self, user: &UserId) -> Result<Vec<JobId>, StoreError>;
    fn add(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError>;
    fn remove(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError>;
}

/// Application records keyed by (user, job). Submitting while a non-withdrawn
/// application holds the slot is a [`WriteOutcome::NoOp`]; withdrawing frees
/// the slot for a later re-submit.
pub trait ApplicationStore: Send + Sync {
    fn for_user(&self, user: &UserId) -> Result<Vec<JobApplication>, StoreError>;
    fn submit(&self, application: JobApplication) -> Result<WriteOutcome, StoreError>;
    fn withdraw(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError>;
}

/// Result of an idempotent store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Applied,
    NoOp,
}

/// Error enumeration for collaborator failures. The core never retries; the
/// error is surfaced to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
