use serde::{Deserialize, Serialize};

/// Snapshot of the user's career profile, resolved by the caller for each request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub industry: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education_level: String,
    #[serde(default)]
    pub target_role: String,
    #[serde(default)]
    pub background: String,
}

impl UserProfile {
    /// Rejects profiles that cannot produce a meaningful prompt.
    pub fn validate(&self) -> Result<(), String> {
        if self.industry.trim().is_empty() {
            return Err("industry cannot be empty".to_string());
        }
        if self.skills.iter().any(|s| s.trim().is_empty()) {
            return Err("skills cannot contain blank entries".to_string());
        }
        Ok(())
    }

    /// Skills lowercased, trimmed, sorted and deduplicated. Used for cache identity.
    pub fn normalized_skills(&self) -> Vec<String> {
        let mut skills: Vec<String> = self.skills.iter().map(|s| normalize_skill(s)).collect();
        skills.sort();
        skills.dedup();
        skills
    }
}

/// Case-insensitive comparison key for a skill name.
pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// The four prompt templates the pipeline knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Roadmap,
    SkillGap,
    InterviewQuestion,
    InterviewFeedback,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Roadmap => "roadmap",
            TemplateKind::SkillGap => "skill_gap",
            TemplateKind::InterviewQuestion => "interview_question",
            TemplateKind::InterviewFeedback => "interview_feedback",
        }
    }
}

/// A request for one of the insight templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptRequest {
    Roadmap {
        profile: UserProfile,
    },
    SkillGap {
        profile: UserProfile,
    },
    InterviewQuestion {
        profile: UserProfile,
        history: Vec<String>,
    },
    InterviewFeedback {
        profile: UserProfile,
        history: Vec<String>,
    },
}

impl PromptRequest {
    pub fn kind(&self) -> TemplateKind {
        match self {
            PromptRequest::Roadmap { .. } => TemplateKind::Roadmap,
            PromptRequest::SkillGap { .. } => TemplateKind::SkillGap,
            PromptRequest::InterviewQuestion { .. } => TemplateKind::InterviewQuestion,
            PromptRequest::InterviewFeedback { .. } => TemplateKind::InterviewFeedback,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        match self {
            PromptRequest::Roadmap { profile }
            | PromptRequest::SkillGap { profile }
            | PromptRequest::InterviewQuestion { profile, .. }
            | PromptRequest::InterviewFeedback { profile, .. } => profile,
        }
    }

    pub fn history(&self) -> &[String] {
        match self {
            PromptRequest::InterviewQuestion { history, .. }
            | PromptRequest::InterviewFeedback { history, .. } => history,
            _ => &[],
        }
    }

    /// Validates caller input before any network call is made.
    pub fn validate(&self) -> Result<(), String> {
        self.profile().validate()?;

        if self.history().iter().any(|u| u.trim().is_empty()) {
            return Err("history cannot contain blank utterances".to_string());
        }
        if let PromptRequest::InterviewFeedback { history, .. } = self {
            if history.is_empty() {
                return Err("feedback requires a non-empty interview history".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(industry: &str, skills: &[&str]) -> UserProfile {
        UserProfile {
            industry: industry.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_industry_is_rejected() {
        let err = profile("   ", &["Rust"]).validate().unwrap_err();
        assert!(err.contains("industry"));
    }

    #[test]
    fn test_blank_skill_is_rejected() {
        assert!(profile("Fintech", &["Rust", " "]).validate().is_err());
    }

    #[test]
    fn test_normalized_skills_sorted_and_deduped() {
        let p = profile("Fintech", &[" SQL", "python", "Python ", "sql"]);
        assert_eq!(p.normalized_skills(), vec!["python", "sql"]);
    }

    #[test]
    fn test_feedback_requires_history() {
        let req = PromptRequest::InterviewFeedback {
            profile: profile("Fintech", &[]),
            history: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_question_allows_empty_history() {
        let req = PromptRequest::InterviewQuestion {
            profile: profile("Fintech", &[]),
            history: vec![],
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.kind(), TemplateKind::InterviewQuestion);
    }

    #[test]
    fn test_blank_utterance_is_rejected() {
        let req = PromptRequest::InterviewQuestion {
            profile: profile("Fintech", &[]),
            history: vec!["Tell me about yourself".to_string(), "".to_string()],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_profile_deserializes_with_defaults() {
        let p: UserProfile =
            serde_json::from_str(r#"{"industry": "Healthcare", "skills": ["HL7"]}"#).unwrap();
        assert_eq!(p.industry, "Healthcare");
        assert!(p.target_role.is_empty());
        assert!(p.background.is_empty());
    }
}
