//! Insight Pipeline — orchestrates a single insight request.
//!
//! Flow: validate → build prompt → (cache →) gateway → extract → decode →
//!       skill gap engine (skill-gap requests only) → typed result.
//!
//! Extraction failures never fail the request: each operation degrades to a
//! well-formed result with `degraded = true`. Gateway failures propagate.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::insights::cache::{CacheKey, InsightCache};
use crate::insights::extractor::{extract_typed, Fallback, FallbackReason};
use crate::insights::prompts::{PromptBuilder, DEFAULT_ROADMAP_WEEKS};
use crate::insights::skill_gap::{compute_gap, degraded_report, RiskThresholds};
use crate::llm_client::{GatewayError, GatewayOptions, ModelGateway, ModelResponse};
use crate::models::insights::{
    InterviewFeedbackResult, InterviewQuestionResult, RoadmapResult, RoadmapWeek, SkillGapReport,
};
use crate::models::profile::{PromptRequest, UserProfile};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub gateway_options: GatewayOptions,
    pub risk_thresholds: RiskThresholds,
    pub roadmap_weeks: u32,
    /// Zero disables the cache.
    pub cache_ttl: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            gateway_options: GatewayOptions::default(),
            risk_thresholds: RiskThresholds::default(),
            roadmap_weeks: DEFAULT_ROADMAP_WEEKS,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model payloads (what the templates ask the backend to return)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkillGapPayload {
    #[serde(alias = "required_skills")]
    required_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RoadmapPayload {
    #[serde(default)]
    summary: String,
    weeks: Vec<RoadmapWeek>,
}

#[derive(Debug, Deserialize)]
struct QuestionPayload {
    question: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FeedbackPayload {
    score: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    summary: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct InsightPipeline {
    gateway: Arc<dyn ModelGateway>,
    builder: PromptBuilder,
    settings: PipelineSettings,
    cache: Option<Arc<InsightCache<ModelResponse>>>,
}

impl InsightPipeline {
    pub fn new(gateway: Arc<dyn ModelGateway>, settings: PipelineSettings) -> Self {
        let cache = (!settings.cache_ttl.is_zero()).then(|| Arc::new(InsightCache::new()));
        Self {
            gateway,
            builder: PromptBuilder::new(settings.roadmap_weeks),
            settings,
            cache,
        }
    }

    pub fn cache(&self) -> Option<&InsightCache<ModelResponse>> {
        self.cache.as_deref()
    }

    /// Compares the user's skills with the skills the model lists for their industry.
    pub async fn skill_gap(&self, profile: UserProfile) -> Result<SkillGapReport, PipelineError> {
        let request = PromptRequest::SkillGap { profile };
        let payload = self.run::<SkillGapPayload>(&request).await?;
        let profile = request.profile();

        let report = match payload {
            Ok(payload) => compute_gap(
                &profile.industry,
                &profile.skills,
                &payload.required_skills,
                &self.settings.risk_thresholds,
            ),
            Err(fallback) => degraded_report(
                &profile.industry,
                &profile.skills,
                &fallback.reason.to_string(),
            ),
        };

        info!(
            "Skill gap for {}: {} missing, risk={:?}",
            report.industry,
            report.missing_skills.len(),
            report.risk_level
        );
        Ok(report)
    }

    pub async fn roadmap(&self, profile: UserProfile) -> Result<RoadmapResult, PipelineError> {
        let request = PromptRequest::Roadmap { profile };
        let payload = self
            .run::<RoadmapPayload>(&request)
            .await?
            .and_then(|p| {
                if p.weeks.is_empty() {
                    Err(schema_fallback("roadmap has no weeks"))
                } else {
                    Ok(p)
                }
            });

        let generated_at = Utc::now();
        let next_review_at =
            generated_at + chrono::Duration::weeks(i64::from(self.builder.roadmap_weeks()));
        let target_role = request.profile().target_role.clone();

        let result = match payload {
            Ok(mut payload) => {
                payload.weeks.sort_by_key(|w| w.week);
                RoadmapResult {
                    target_role,
                    weeks: payload.weeks,
                    summary: payload.summary,
                    generated_at,
                    next_review_at,
                    degraded: false,
                }
            }
            Err(fallback) => RoadmapResult {
                target_role,
                weeks: vec![],
                summary: format!(
                    "A roadmap could not be generated right now ({}). Please try again later.",
                    fallback.reason
                ),
                generated_at,
                next_review_at,
                degraded: true,
            },
        };

        info!("Roadmap generated: {} weeks", result.weeks.len());
        Ok(result)
    }

    /// Produces the next mock interview question given the transcript so far.
    pub async fn interview_question(
        &self,
        profile: UserProfile,
        history: Vec<String>,
    ) -> Result<InterviewQuestionResult, PipelineError> {
        let request = PromptRequest::InterviewQuestion { profile, history };
        let payload = self
            .run::<QuestionPayload>(&request)
            .await?
            .and_then(|p| {
                if p.question.trim().is_empty() {
                    Err(schema_fallback("question is empty"))
                } else {
                    Ok(p)
                }
            });
        let history_len = request.history().len();

        Ok(match payload {
            Ok(payload) => InterviewQuestionResult {
                question: payload.question.trim().to_string(),
                category: if payload.category.trim().is_empty() {
                    "general".to_string()
                } else {
                    payload.category.trim().to_lowercase()
                },
                tips: payload.tips,
                history_len,
                degraded: false,
            },
            Err(_) => {
                let profile = request.profile();
                let subject = if profile.target_role.trim().is_empty() {
                    profile.industry.as_str()
                } else {
                    profile.target_role.as_str()
                };
                InterviewQuestionResult {
                    question: format!(
                        "Walk me through your background and what draws you to {subject}."
                    ),
                    category: "general".to_string(),
                    tips: vec![],
                    history_len,
                    degraded: true,
                }
            }
        })
    }

    /// Scores a completed mock interview transcript.
    pub async fn interview_feedback(
        &self,
        profile: UserProfile,
        history: Vec<String>,
    ) -> Result<InterviewFeedbackResult, PipelineError> {
        let request = PromptRequest::InterviewFeedback { profile, history };
        let payload = self.run::<FeedbackPayload>(&request).await?;

        Ok(match payload {
            Ok(payload) => InterviewFeedbackResult {
                score: payload.score.round().clamp(0.0, 10.0) as u8,
                strengths: payload.strengths,
                improvements: payload.improvements,
                summary: payload.summary,
                degraded: false,
            },
            Err(fallback) => InterviewFeedbackResult {
                score: 0,
                strengths: vec![],
                improvements: vec![],
                summary: format!(
                    "Feedback could not be generated right now ({}). Please try again later.",
                    fallback.reason
                ),
                degraded: true,
            },
        })
    }

    /// Sends the request and decodes the response into `T`.
    ///
    /// The outer `Result` carries validation and gateway failures; the inner one
    /// carries extraction fallbacks, which callers must handle explicitly.
    async fn run<T: DeserializeOwned>(
        &self,
        request: &PromptRequest,
    ) -> Result<Result<T, Fallback>, PipelineError> {
        request.validate().map_err(PipelineError::Validation)?;

        let response = self.complete(request).await?;
        debug!(
            "Model response: kind={}, backend={}, latency_ms={}",
            request.kind().as_str(),
            response.backend,
            response.latency.as_millis()
        );

        let decoded = extract_typed::<T>(&response.text);
        if let Err(fallback) = &decoded {
            warn!(
                "Extraction fell back for {}: {}",
                request.kind().as_str(),
                fallback.reason
            );
            debug!("Unparsed model text: {}", fallback.original_text);
            // An unreadable answer should not be served again from the cache.
            if let Some(cache) = &self.cache {
                cache.invalidate(&CacheKey::for_request(request));
            }
        }
        Ok(decoded)
    }

    async fn complete(&self, request: &PromptRequest) -> Result<ModelResponse, GatewayError> {
        let prompt = self.builder.build(request);
        let options = &self.settings.gateway_options;

        match &self.cache {
            Some(cache) => {
                cache
                    .get_or_compute(
                        CacheKey::for_request(request),
                        self.settings.cache_ttl,
                        || self.gateway.send(&prompt, options),
                    )
                    .await
            }
            None => self.gateway.send(&prompt, options).await,
        }
    }
}

fn schema_fallback(detail: &str) -> Fallback {
    Fallback {
        reason: FallbackReason::SchemaMismatch(detail.to_string()),
        original_text: String::new(),
    }
}
