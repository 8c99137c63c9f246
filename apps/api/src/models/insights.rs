use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Skill gap
// ────────────────────────────────────────────────────────────────────────────

/// Coarse classification of how large a skill gap is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGapReport {
    pub industry: String,
    pub user_skills: Vec<String>,
    /// Model order, most relevant first.
    pub required_skills: Vec<String>,
    /// Always a subset of `required_skills`, in the same order.
    pub missing_skills: Vec<String>,
    pub risk_level: RiskLevel,
    pub summary: String,
    #[serde(default)]
    pub degraded: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Roadmap
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapWeek {
    pub week: u32,
    pub focus: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapResult {
    pub target_role: String,
    pub weeks: Vec<RoadmapWeek>,
    pub summary: String,
    pub generated_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    #[serde(default)]
    pub degraded: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Interview
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestionResult {
    pub question: String,
    pub category: String,
    pub tips: Vec<String>,
    /// Number of prior utterances the question was generated from.
    pub history_len: usize,
    #[serde(default)]
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewFeedbackResult {
    /// 0 – 10
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub summary: String,
    #[serde(default)]
    pub degraded: bool,
}
