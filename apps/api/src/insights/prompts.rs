// All prompt templates for the insights module.
// Placeholders are `{name}`; they are filled in a single pass so profile text
// that happens to contain `{...}` is never re-substituted.

use crate::llm_client::prompts::{EMPTY_TRANSCRIPT_MARKER, JSON_ONLY_INSTRUCTION, NOT_PROVIDED};
use crate::models::profile::{PromptRequest, UserProfile};

pub const DEFAULT_ROADMAP_WEEKS: u32 = 8;

const PROFILE_BLOCK: &str = "USER PROFILE:
- Industry: {industry}
- Target role: {target_role}
- Education level: {education_level}
- Current skills: {skills}
- Background: {background}";

pub const SKILL_GAP_PROMPT_TEMPLATE: &str = r#"You are an experienced career advisor for the {industry} industry.

{profile}

List the skills most commonly required for a professional in the {industry} industry
targeting the role above. Order them from most to least relevant and include at most 12.
Include skills the user already has; the comparison is done separately.

{json_instruction}
{
  "requiredSkills": ["skill name", "..."]
}"#;

pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"You are an experienced career coach for the {industry} industry.

{profile}

Create a {weeks}-week learning roadmap that moves this user toward the target role.
Each week has one focus area and 2 to 4 concrete tasks. Build on the skills the user
already has; do not schedule what they already know.

{json_instruction}
{
  "summary": "one or two sentences describing the overall plan",
  "weeks": [
    {"week": 1, "focus": "focus area", "tasks": ["task", "..."]}
  ]
}"#;

pub const INTERVIEW_QUESTION_PROMPT_TEMPLATE: &str = r#"You are conducting a mock interview for a candidate in the {industry} industry.

{profile}

INTERVIEW TRANSCRIPT SO FAR:
{transcript}

Ask the next interview question. Do not repeat a question already asked in the
transcript. Mix technical and behavioral questions appropriate to the target role.

{json_instruction}
{
  "question": "the next question",
  "category": "technical" | "behavioral" | "situational",
  "tips": ["short hint on what a strong answer covers", "..."]
}"#;

pub const INTERVIEW_FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are reviewing a mock interview for a candidate in the {industry} industry.

{profile}

INTERVIEW TRANSCRIPT:
{transcript}

Evaluate the candidate's answers. Score the overall performance from 0 to 10,
list concrete strengths, and list specific improvements.

{json_instruction}
{
  "score": 7,
  "strengths": ["..."],
  "improvements": ["..."],
  "summary": "two or three sentences of overall feedback"
}"#;

/// Renders `PromptRequest`s into prompt text. Pure; every request maps to a
/// non-empty prompt.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    roadmap_weeks: u32,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ROADMAP_WEEKS)
    }
}

impl PromptBuilder {
    pub fn new(roadmap_weeks: u32) -> Self {
        Self {
            roadmap_weeks: roadmap_weeks.max(1),
        }
    }

    pub fn roadmap_weeks(&self) -> u32 {
        self.roadmap_weeks
    }

    pub fn build(&self, request: &PromptRequest) -> String {
        let profile = request.profile();
        let profile_block = render_profile(profile);
        let industry = or_not_provided(&profile.industry);

        match request {
            PromptRequest::SkillGap { .. } => fill(
                SKILL_GAP_PROMPT_TEMPLATE,
                &[
                    ("industry", &industry),
                    ("profile", &profile_block),
                    ("json_instruction", JSON_ONLY_INSTRUCTION),
                ],
            ),
            PromptRequest::Roadmap { .. } => fill(
                ROADMAP_PROMPT_TEMPLATE,
                &[
                    ("industry", &industry),
                    ("profile", &profile_block),
                    ("weeks", &self.roadmap_weeks.to_string()),
                    ("json_instruction", JSON_ONLY_INSTRUCTION),
                ],
            ),
            PromptRequest::InterviewQuestion { history, .. } => fill(
                INTERVIEW_QUESTION_PROMPT_TEMPLATE,
                &[
                    ("industry", &industry),
                    ("profile", &profile_block),
                    ("transcript", &render_transcript(history)),
                    ("json_instruction", JSON_ONLY_INSTRUCTION),
                ],
            ),
            PromptRequest::InterviewFeedback { history, .. } => fill(
                INTERVIEW_FEEDBACK_PROMPT_TEMPLATE,
                &[
                    ("industry", &industry),
                    ("profile", &profile_block),
                    ("transcript", &render_transcript(history)),
                    ("json_instruction", JSON_ONLY_INSTRUCTION),
                ],
            ),
        }
    }
}

fn render_profile(profile: &UserProfile) -> String {
    let skills = if profile.skills.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        profile.skills.join(", ")
    };

    fill(
        PROFILE_BLOCK,
        &[
            ("industry", &or_not_provided(&profile.industry)),
            ("target_role", &or_not_provided(&profile.target_role)),
            ("education_level", &or_not_provided(&profile.education_level)),
            ("skills", &skills),
            ("background", &or_not_provided(&profile.background)),
        ],
    )
}

/// Numbered utterances, or an explicit marker when nothing has been said yet.
fn render_transcript(history: &[String]) -> String {
    if history.is_empty() {
        return EMPTY_TRANSCRIPT_MARKER.to_string();
    }
    history
        .iter()
        .enumerate()
        .map(|(i, utterance)| format!("{}. {}", i + 1, utterance))
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_not_provided(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        value.to_string()
    }
}

/// Single-pass `{name}` substitution. Unknown `{...}` sequences are copied through.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
