pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::insights::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Insights API
        .route("/api/v1/insights/roadmap", post(handlers::handle_roadmap))
        .route("/api/v1/insights/skill-gap", post(handlers::handle_skill_gap))
        // Mock interview API
        .route(
            "/api/v1/interview/question",
            post(handlers::handle_interview_question),
        )
        .route(
            "/api/v1/interview/feedback",
            post(handlers::handle_interview_feedback),
        )
        .with_state(state)
}
