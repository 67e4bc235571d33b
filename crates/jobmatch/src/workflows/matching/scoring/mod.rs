mod config;
mod rules;

pub use config::ScoringConfig;
pub(crate) use rules::score_job;

use serde::{Deserialize, Serialize};

/// Factors permitted in the ranking rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    SkillOverlap,
    KeywordRelevance,
    ExperienceAlignment,
    Recency,
}

/// Discrete contribution to a job's rank, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub score: i16,
    pub notes: String,
}
