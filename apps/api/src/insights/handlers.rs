//! Axum route handlers for the Insights and Interview APIs.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::insights::{
    InterviewFeedbackResult, InterviewQuestionResult, RoadmapResult, SkillGapReport,
};
use crate::models::profile::UserProfile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub profile: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct InterviewRequest {
    pub profile: UserProfile,
    /// Prior utterances, oldest first.
    #[serde(default)]
    pub history: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/insights/roadmap
pub async fn handle_roadmap(
    State(state): State<AppState>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<RoadmapResult>, AppError> {
    let roadmap = state.pipeline.roadmap(request.profile).await?;
    Ok(Json(roadmap))
}

/// POST /api/v1/insights/skill-gap
///
/// Asks the model which skills the user's industry requires and reports the
/// ones missing from the profile, with a risk tier.
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<SkillGapReport>, AppError> {
    let report = state.pipeline.skill_gap(request.profile).await?;
    Ok(Json(report))
}

/// POST /api/v1/interview/question
pub async fn handle_interview_question(
    State(state): State<AppState>,
    Json(request): Json<InterviewRequest>,
) -> Result<Json<InterviewQuestionResult>, AppError> {
    let question = state
        .pipeline
        .interview_question(request.profile, request.history)
        .await?;
    Ok(Json(question))
}

/// POST /api/v1/interview/feedback
///
/// Scores a finished mock interview. `history` must contain at least one utterance.
pub async fn handle_interview_feedback(
    State(state): State<AppState>,
    Json(request): Json<InterviewRequest>,
) -> Result<Json<InterviewFeedbackResult>, AppError> {
    let feedback = state
        .pipeline
        .interview_feedback(request.profile, request.history)
        .await?;
    Ok(Json(feedback))
}
