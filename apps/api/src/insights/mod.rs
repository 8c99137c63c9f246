// Structured insight pipeline: prompt building, model calls, extraction of
// structured answers, skill gap analysis and per-request caching.
// All model calls go through llm_client::ModelGateway.

pub mod cache;
pub mod extractor;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod skill_gap;
