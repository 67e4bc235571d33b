use chrono::{Duration, Local, NaiveDate, Utc};
use jobmatch::auth::{AuthError, Principal, TokenVerifier};
use jobmatch::workflows::matching::{
    ApplicationStatus, ApplicationStore, EducationEntry, EmploymentType, ExperienceEntry,
    ExperienceLevel, Job, JobApplication, JobCatalog, JobId, Role, SalaryRange, ScoringConfig,
    ShortlistStore, StoreError, UserAccount, UserDirectory, UserId, WriteOutcome,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory catalog stand-in for the job store collaborator.
#[derive(Default)]
pub(crate) struct InMemoryJobCatalog {
    jobs: Mutex<Vec<Job>>,
}

impl InMemoryJobCatalog {
    pub(crate) fn insert(&self, job: Job) {
        debug_assert!(job.salary.is_ordered(), "salary range must be ordered");
        let mut guard = self.jobs.lock().expect("catalog mutex poisoned");
        guard.retain(|existing| existing.id != job.id);
        guard.push(job);
    }
}

impl JobCatalog for InMemoryJobCatalog {
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

#[derive(Default)]
pub(crate) struct InMemoryUserDirectory {
    users: Mutex<HashMap<UserId, UserAccount>>,
}

impl InMemoryUserDirectory {
    pub(crate) fn insert(&self, account: UserAccount) {
        self.users
            .lock()
            .expect("directory mutex poisoned")
            .insert(account.id.clone(), account);
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("directory mutex poisoned")
            .get(id)
            .cloned())
    }
}

/// Shortlist sets keyed by user; the per-(user, job) upsert keeps duplicate
/// clicks idempotent.
#[derive(Default)]
pub(crate) struct InMemoryShortlistStore {
    entries: Mutex<HashMap<UserId, BTreeSet<JobId>>>,
}

impl ShortlistStore for InMemoryShortlistStore {
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

/// Application records keyed by (user, job); a live record blocks duplicate
/// submits, withdrawal frees the slot.
#[derive(Default)]
pub(crate) struct InMemoryApplicationStore {
    records: Mutex<HashMap<(UserId, JobId), JobApplication>>,
}

impl ApplicationStore for InMemoryApplicationStore {
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
                application.status = ApplicationStatus::Withdrawn;
                Ok(WriteOutcome::Applied)
            }
            _ => Ok(WriteOutcome::NoOp),
        }
    }
}

/// Token table standing in for the identity provider during local runs.
#[derive(Default)]
pub(crate) struct StaticTokenVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenVerifier {
    pub(crate) fn register(&mut self, token: &str, user: &str, role: Role) {
        self.tokens.insert(
            token.to_string(),
            Principal {
                user_id: UserId(user.to_string()),
                role,
            },
        );
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

pub(crate) fn default_scoring_config() -> ScoringConfig {
    ScoringConfig {
        points_per_matched_skill: 15,
        points_per_keyword_hit: 5,
        experience_alignment_points: 10,
        recency_window_days: 14,
        recency_points: 5,
    }
}

/// Everything the binary needs to stand up a usable local instance: seeded
/// stores plus the bearer tokens that unlock them.
pub(crate) struct DemoFixture {
    pub(crate) catalog: Arc<InMemoryJobCatalog>,
    pub(crate) directory: Arc<InMemoryUserDirectory>,
    pub(crate) shortlists: Arc<InMemoryShortlistStore>,
    pub(crate) applications: Arc<InMemoryApplicationStore>,
    pub(crate) verifier: Arc<StaticTokenVerifier>,
    pub(crate) tokens: Vec<(&'static str, &'static str)>,
}

pub(crate) const DEMO_SEEKER: &str = "ada";
pub(crate) const DEMO_SEEKER_TOKEN: &str = "demo-ada-token";

fn fixture_job(
    id: &str,
    title: &str,
    skills: &[&str],
    level: ExperienceLevel,
    posted_days_ago: i64,
    deadline: Option<NaiveDate>,
) -> Job {
    let created = Utc::now() - Duration::days(posted_days_ago);
    Job {
        id: JobId(id.to_string()),
        title: title.to_string(),
        description: format!("{title} working on the hiring marketplace"),
        requirements: vec![
            "ships production services".to_string(),
            "writes clear design notes".to_string(),
        ],
        location: "Remote (EU)".to_string(),
        employment_types: vec![EmploymentType::FullTime],
        salary: SalaryRange {
            min: Some(72_000),
            max: Some(108_000),
        },
        skills_needed: skills.iter().map(|skill| skill.to_string()).collect(),
        experience_level: level,
        posted_by: UserId("northwind".to_string()),
        deadline,
        created_at: created,
        updated_at: created,
        applicants: Vec::new(),
    }
}

pub(crate) fn demo_fixture() -> DemoFixture {
    let catalog = Arc::new(InMemoryJobCatalog::default());
    let directory = Arc::new(InMemoryUserDirectory::default());
    let shortlists = Arc::new(InMemoryShortlistStore::default());
    let applications = Arc::new(InMemoryApplicationStore::default());

    let today = Local::now().date_naive();

    directory.insert(UserAccount {
        id: UserId(DEMO_SEEKER.to_string()),
        email: "ada@example.com".to_string(),
        role: Role::JobSeeker,
        skills: vec![
            "rust".to_string(),
            "tokio".to_string(),
            "postgres".to_string(),
        ],
        education: vec![EducationEntry {
            institution: "State University".to_string(),
            credential: "BSc Computer Science".to_string(),
            completed_in: Some(2018),
        }],
        experience: vec![
            ExperienceEntry {
                title: "Backend Engineer".to_string(),
                organization: "Previous Startup".to_string(),
                months: 30,
            },
            ExperienceEntry {
                title: "Software Engineer".to_string(),
                organization: "Consultancy".to_string(),
                months: 24,
            },
        ],
        company_name: None,
    });
    directory.insert(UserAccount {
        id: UserId("northwind".to_string()),
        email: "talent@northwind.example.com".to_string(),
        role: Role::Employer,
        skills: Vec::new(),
        education: Vec::new(),
        experience: Vec::new(),
        company_name: Some("Northwind Logistics".to_string()),
    });
    directory.insert(UserAccount {
        id: UserId("ops".to_string()),
        email: "ops@example.com".to_string(),
        role: Role::Admin,
        skills: Vec::new(),
        education: Vec::new(),
        experience: Vec::new(),
        company_name: None,
    });

    catalog.insert(fixture_job(
        "core-backend-01",
        "Backend Engineer",
        &["rust", "tokio", "postgres"],
        ExperienceLevel::Mid,
        3,
        None,
    ));
    catalog.insert(fixture_job(
        "platform-02",
        "Platform Engineer",
        &["kubernetes", "go"],
        ExperienceLevel::Mid,
        10,
        Some(today + Duration::days(30)),
    ));
    catalog.insert(fixture_job(
        "data-03",
        "Data Engineer",
        &["python", "sql"],
        ExperienceLevel::Senior,
        21,
        None,
    ));
    catalog.insert(fixture_job(
        "intern-04",
        "Engineering Intern",
        &["javascript"],
        ExperienceLevel::Entry,
        40,
        Some(today - Duration::days(5)),
    ));

    let mut verifier = StaticTokenVerifier::default();
    verifier.register(DEMO_SEEKER_TOKEN, DEMO_SEEKER, Role::JobSeeker);
    verifier.register("demo-northwind-token", "northwind", Role::Employer);
    verifier.register("demo-ops-token", "ops", Role::Admin);

    DemoFixture {
        catalog,
        directory,
        shortlists,
        applications,
        verifier: Arc::new(verifier),
        tokens: vec![
            (DEMO_SEEKER_TOKEN, "ada (job_seeker)"),
            ("demo-northwind-token", "northwind (employer)"),
            ("demo-ops-token", "ops (admin)"),
        ],
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
