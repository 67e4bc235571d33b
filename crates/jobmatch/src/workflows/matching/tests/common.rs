use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use crate::auth::{AuthError, Principal, TokenVerifier};
use crate::workflows::matching::domain::{
    EmploymentType, ExperienceEntry, ExperienceLevel, Job, JobApplication, JobId, Role,
    SalaryRange, UserAccount, UserId,
};
use crate::workflows::matching::engine::{RankedJob, RecommendationBatch};
use crate::workflows::matching::scoring::ScoringConfig;
use crate::workflows::matching::service::MatchingService;
use crate::workflows::matching::stores::{
    ApplicationStore, JobCatalog, ShortlistStore, StoreError, UserDirectory, WriteOutcome,
};

pub(super) type TestService =
    MatchingService<MemoryCatalog, MemoryDirectory, MemoryShortlist, MemoryApplications>;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 15).expect("valid date")
}

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig {
        points_per_matched_skill: 15,
        points_per_keyword_hit: 5,
        experience_alignment_points: 10,
        recency_window_days: 14,
        recency_points: 5,
    }
}

pub(super) fn job(id: &str, title: &str, skills: &[&str], posted_days_ago: i64) -> Job {
    let created = Utc
        .with_ymd_and_hms(2025, 7, 15, 9, 0, 0)
        .single()
        .expect("valid timestamp")
        - Duration::days(posted_days_ago);

    Job {
        id: JobId(id.to_string()),
        title: title.to_string(),
        description: format!("{title} opening on the platform team"),
        requirements: vec!["communicates clearly".to_string()],
        location: "Remote".to_string(),
        employment_types: vec![EmploymentType::FullTime],
        salary: SalaryRange {
            min: Some(70_000),
            max: Some(95_000),
        },
        skills_needed: skills.iter().map(|skill| skill.to_string()).collect(),
        experience_level: ExperienceLevel::Mid,
        posted_by: UserId("employer-1".to_string()),
        deadline: None,
        created_at: created,
        updated_at: created,
        applicants: Vec::new(),
    }
}

pub(super) fn seeker(id: &str, skills: &[&str]) -> UserAccount {
    UserAccount {
        id: UserId(id.to_string()),
        email: format!("{id}@example.com"),
        role: Role::JobSeeker,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        education: Vec::new(),
        experience: vec![ExperienceEntry {
            title: "Engineer".to_string(),
            organization: "Prior Co".to_string(),
            months: 36,
        }],
        company_name: None,
    }
}

pub(super) fn employer(id: &str) -> UserAccount {
    UserAccount {
        id: UserId(id.to_string()),
        email: format!("{id}@example.com"),
        role: Role::Employer,
        skills: Vec::new(),
        education: Vec::new(),
        experience: Vec::new(),
        company_name: Some("Acme Hiring".to_string()),
    }
}

pub(super) fn ranked(job: Job) -> RankedJob {
    RankedJob {
        job,
        score: 0,
        components: Vec::new(),
    }
}

pub(super) fn batch_for(user: &str, jobs: Vec<Job>) -> RecommendationBatch {
    RecommendationBatch {
        user: UserId(user.to_string()),
        jobs: jobs.into_iter().map(ranked).collect(),
    }
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    jobs: Mutex<Vec<Job>>,
}

impl MemoryCatalog {
    pub(super) fn seed(&self, job: Job) {
        self.jobs.lock().expect("catalog mutex poisoned").push(job);
    }
}

impl JobCatalog for MemoryCatalog {
    fn all(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.jobs.lock().expect("catalog mutex poisoned").clone())
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self
            .jobs
            .lock()
            .expect("catalog mutex poisoned")
            .iter()
            .find(|job| &job.id == id)
            .cloned())
    }
}

/// Catalog stand-in for an unreachable upstream.
#[derive(Default)]
pub(super) struct BrokenCatalog;

impl JobCatalog for BrokenCatalog {
    fn all(&self) -> Result<Vec<Job>, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }

    fn fetch(&self, _id: &JobId) -> Result<Option<Job>, StoreError> {
        Err(StoreError::Unavailable("catalog offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    users: Mutex<HashMap<UserId, UserAccount>>,
}

impl MemoryDirectory {
    pub(super) fn seed(&self, account: UserAccount) {
        self.users
            .lock()
            .expect("directory mutex poisoned")
            .insert(account.id.clone(), account);
    }
}

impl UserDirectory for MemoryDirectory {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("directory mutex poisoned")
            .get(id)
            .cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryShortlist {
    entries: Mutex<HashMap<UserId, BTreeSet<JobId>>>,
}

impl ShortlistStore for MemoryShortlist {
    fn jobs(&self, user: &UserId) -> Result<Vec<JobId>, StoreError> {
        Ok(self
            .entries
            .lock()
            .expect("shortlist mutex poisoned")
            .get(user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn add(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError> {
        let mut guard = self.entries.lock().expect("shortlist mutex poisoned");
        let inserted = guard.entry(user.clone()).or_default().insert(job.clone());
        Ok(if inserted {
            WriteOutcome::Applied
        } else {
            WriteOutcome::NoOp
        })
    }

    fn remove(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError> {
        let mut guard = self.entries.lock().expect("shortlist mutex poisoned");
        let removed = guard
            .get_mut(user)
            .map(|set| set.remove(job))
            .unwrap_or(false);
        Ok(if removed {
            WriteOutcome::Applied
        } else {
            WriteOutcome::NoOp
        })
    }
}

/// Shortlist wrapper that fails a configured number of writes before
/// recovering, for retry scenarios.
#[derive(Default)]
pub(super) struct FlakyShortlist {
    inner: MemoryShortlist,
    failures_remaining: AtomicUsize,
}

impl FlakyShortlist {
    pub(super) fn failing(times: usize) -> Self {
        let store = Self::default();
        store.failures_remaining.store(times, Ordering::SeqCst);
        store
    }
}

impl ShortlistStore for FlakyShortlist {
    fn jobs(&self, user: &UserId) -> Result<Vec<JobId>, StoreError> {
        self.inner.jobs(user)
    }

    fn add(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("shortlist write timed out".to_string()));
        }
        self.inner.add(user, job)
    }

    fn remove(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError> {
        self.inner.remove(user, job)
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<HashMap<(UserId, JobId), JobApplication>>,
}

impl ApplicationStore for MemoryApplications {
    fn for_user(&self, user: &UserId) -> Result<Vec<JobApplication>, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("application mutex poisoned")
            .values()
            .filter(|application| &application.user == user)
            .cloned()
            .collect())
    }

    fn submit(&self, application: JobApplication) -> Result<WriteOutcome, StoreError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        let key = (application.user.clone(), application.job.clone());
        if guard
            .get(&key)
            .map(|existing| existing.status.is_active())
            .unwrap_or(false)
        {
            return Ok(WriteOutcome::NoOp);
        }
        guard.insert(key, application);
        Ok(WriteOutcome::Applied)
    }

    fn withdraw(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        match guard.get_mut(&(user.clone(), job.clone())) {
            Some(application) if application.status.is_active() => {
                application.status =
                    crate::workflows::matching::domain::ApplicationStatus::Withdrawn;
                Ok(WriteOutcome::Applied)
            }
            _ => Ok(WriteOutcome::NoOp),
        }
    }
}

/// Token verifier backed by a fixed token table, standing in for the
/// identity provider.
#[derive(Default)]
pub(super) struct StaticVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticVerifier {
    pub(super) fn with_token(mut self, token: &str, user: &str, role: Role) -> Self {
        self.tokens.insert(
            token.to_string(),
            Principal {
                user_id: UserId(user.to_string()),
                role,
            },
        );
        self
    }
}

impl TokenVerifier for StaticVerifier {
    fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

pub(super) fn build_service() -> (
    Arc<TestService>,
    Arc<MemoryCatalog>,
    Arc<MemoryDirectory>,
    Arc<MemoryShortlist>,
    Arc<MemoryApplications>,
) {
    let catalog = Arc::new(MemoryCatalog::default());
    let directory = Arc::new(MemoryDirectory::default());
    let shortlists = Arc::new(MemoryShortlist::default());
    let applications = Arc::new(MemoryApplications::default());
    let service = Arc::new(MatchingService::new(
        catalog.clone(),
        directory.clone(),
        shortlists.clone(),
        applications.clone(),
        scoring_config(),
    ));
    (service, catalog, directory, shortlists, applications)
}
