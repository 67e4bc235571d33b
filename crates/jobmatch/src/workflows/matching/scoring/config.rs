use serde::{Deserialize, Serialize};

/// Rubric configuration for ranking candidate jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub points_per_matched_skill: i16,
    pub points_per_keyword_hit: i16,
    pub experience_alignment_points: i16,
    pub recency_window_days: i64,
    pub recency_points: i16,
}
