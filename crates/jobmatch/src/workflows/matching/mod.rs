//! Job recommendation and swipe-based shortlisting workflow.
//!
//! The catalog, account directory, shortlist, and application stores are
//! external collaborators reached through the traits in [`stores`]; the
//! engine ranks what they return and the swipe session walks the result one
//! job at a time.

pub mod domain;
pub mod engine;
pub mod router;
pub(crate) mod scoring;
pub mod service;
pub mod session;
pub mod stores;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationStatus, EducationEntry, EmploymentType, ExperienceEntry, ExperienceLevel, Job,
    JobApplication, JobId, Role, SalaryRange, UserAccount, UserId,
};
pub use engine::{MatchError, RankedJob, RecommendationBatch, RecommendationEngine};
pub use router::{matching_router, ApiEnvelope};
pub use scoring::{ScoreComponent, ScoreFactor, ScoringConfig};
pub use service::{MatchingService, MatchingServiceError, SessionView};
pub use session::{SessionPhase, SwipeSession};
pub use stores::{
    ApplicationStore, JobCatalog, ShortlistStore, StoreError, UserDirectory, WriteOutcome,
};
