use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for user accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account roles. Fixed at account creation; there is no escalation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    JobSeeker,
    Employer,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::JobSeeker => "job_seeker",
            Self::Employer => "employer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl EmploymentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-Time",
            Self::PartTime => "Part-Time",
            Self::Contract => "Contract",
            Self::Internship => "Internship",
        }
    }
}

pub(crate) fn default_employment_types() -> Vec<EmploymentType> {
    vec![EmploymentType::FullTime]
}

/// Seniority band used both on postings and when profiling a seeker's
/// accumulated experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "Entry",
            Self::Mid => "Mid",
            Self::Senior => "Senior",
        }
    }

    /// Band a seeker by total months of recorded experience.
    pub const fn for_months(months: u32) -> Self {
        match months {
            0..=23 => Self::Entry,
            24..=71 => Self::Mid,
            _ => Self::Senior,
        }
    }
}

/// Advertised salary band. Bounds are optional; when both are present the
/// band must be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl SalaryRange {
    pub fn is_ordered(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }
}

/// A job posting as served by the catalog collaborator. Mutated only by its
/// owner, and never hard-deleted while applications still reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub location: String,
    #[serde(default = "default_employment_types")]
    pub employment_types: Vec<EmploymentType>,
    #[serde(default)]
    pub salary: SalaryRange,
    pub skills_needed: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub posted_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub applicants: Vec<UserId>,
}

impl Job {
    /// Whether the posting still accepts applications on `today`.
    pub fn accepts_applications_on(&self, today: NaiveDate) -> bool {
        self.deadline.map_or(true, |deadline| deadline >= today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub credential: String,
    pub completed_in: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub organization: String,
    pub months: u32,
}

/// Directory view of an account. Credentials live with the identity provider
/// and never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl UserAccount {
    pub fn experience_months(&self) -> u32 {
        self.experience.iter().map(|entry| entry.months).sum()
    }
}

/// Lifecycle status of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applying,
    Submitted,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applying => "applying",
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// A withdrawn application releases the (user, job) slot; every other
    /// status holds it.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Withdrawn)
    }
}

/// One user's application to one job. At most one non-withdrawn application
/// exists per (user, job) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub job: JobId,
    pub user: UserId,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub answers: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}
