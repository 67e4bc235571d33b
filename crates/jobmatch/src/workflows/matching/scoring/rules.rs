use chrono::NaiveDate;

use super::super::domain::{ExperienceLevel, Job, UserAccount};
use super::config::ScoringConfig;
use super::{ScoreComponent, ScoreFactor};

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

pub(crate) fn score_job(
    user: &UserAccount,
    job: &Job,
    config: &ScoringConfig,
    today: NaiveDate,
) -> (Vec<ScoreComponent>, i16) {
    let mut components = Vec::new();
    let mut total_score: i16 = 0;

    let seeker_skills: Vec<String> = user.skills.iter().map(|skill| normalize(skill)).collect();

    let matched_skills = job
        .skills_needed
        .iter()
        .filter(|needed| seeker_skills.iter().any(|skill| skill == &normalize(needed)))
        .count();

    if matched_skills > 0 {
        let score = (matched_skills as i16).saturating_mul(config.points_per_matched_skill);
        components.push(ScoreComponent {
            factor: ScoreFactor::SkillOverlap,
            score,
            notes: format!(
                "matched {matched_skills} of {} required skills",
                job.skills_needed.len()
            ),
        });
        total_score = total_score.saturating_add(score);
    } else {
        components.push(ScoreComponent {
            factor: ScoreFactor::SkillOverlap,
            score: 0,
            notes: "no overlap with required skills".to_string(),
        });
    }

    let haystack = format!("{} {}", normalize(&job.title), normalize(&job.description));
    let keyword_hits = seeker_skills
        .iter()
        .filter(|skill| !skill.is_empty() && haystack.contains(skill.as_str()))
        .count();

    if keyword_hits > 0 {
        let score = (keyword_hits as i16).saturating_mul(config.points_per_keyword_hit);
        components.push(ScoreComponent {
            factor: ScoreFactor::KeywordRelevance,
            score,
            notes: format!("{keyword_hits} profile skill(s) appear in the posting text"),
        });
        total_score = total_score.saturating_add(score);
    }

    let seeker_level = ExperienceLevel::for_months(user.experience_months());
    if seeker_level == job.experience_level {
        components.push(ScoreComponent {
            factor: ScoreFactor::ExperienceAlignment,
            score: config.experience_alignment_points,
            notes: format!("experience matches the {} posting", job.experience_level.label()),
        });
        total_score = total_score.saturating_add(config.experience_alignment_points);
    } else if seeker_level > job.experience_level {
        let score = config.experience_alignment_points / 2;
        components.push(ScoreComponent {
            factor: ScoreFactor::ExperienceAlignment,
            score,
            notes: format!("exceeds the {} posting", job.experience_level.label()),
        });
        total_score = total_score.saturating_add(score);
    } else {
        components.push(ScoreComponent {
            factor: ScoreFactor::ExperienceAlignment,
            score: 0,
            notes: format!("below the {} posting", job.experience_level.label()),
        });
    }

    let age_days = (today - job.created_at.date_naive()).num_days();
    if (0..=config.recency_window_days).contains(&age_days) {
        components.push(ScoreComponent {
            factor: ScoreFactor::Recency,
            score: config.recency_points,
            notes: format!(
                "posted {age_days} day(s) ago, within the {}-day window",
                config.recency_window_days
            ),
        });
        total_score = total_score.saturating_add(config.recency_points);
    }

    (components, total_score)
}
