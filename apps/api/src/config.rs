use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::insights::prompts::DEFAULT_ROADMAP_WEEKS;
use crate::insights::skill_gap::RiskThresholds;
use crate::llm_client::{Provider, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS, MAX_RETRIES_LIMIT};

/// Application configuration loaded from environment variables.
/// Startup fails if `LLM_API_KEY` is missing or any setting does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_provider: Provider,
    pub llm_model: String,
    pub llm_endpoint: Option<String>,
    pub llm_timeout: Duration,
    pub llm_max_retries: u32,
    pub llm_retry_base_delay: Duration,
    pub risk_thresholds: RiskThresholds,
    pub roadmap_weeks: u32,
    /// Zero disables the insight cache.
    pub insight_cache_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm_api_key = get("LLM_API_KEY")
            .context("Required environment variable 'LLM_API_KEY' is not set")?;

        let llm_provider = match get("LLM_PROVIDER") {
            Some(raw) => Provider::from_str(&raw).map_err(anyhow::Error::msg)?,
            None => Provider::Gemini,
        };

        let risk_thresholds = RiskThresholds {
            medium: parse_or(&get, "RISK_MEDIUM_THRESHOLD", 3)?,
            high: parse_or(&get, "RISK_HIGH_THRESHOLD", 6)?,
        };
        if risk_thresholds.high <= risk_thresholds.medium {
            bail!(
                "RISK_HIGH_THRESHOLD ({}) must be greater than RISK_MEDIUM_THRESHOLD ({})",
                risk_thresholds.high,
                risk_thresholds.medium
            );
        }

        let llm_max_retries: u32 = parse_or(&get, "LLM_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        if llm_max_retries > MAX_RETRIES_LIMIT {
            bail!("LLM_MAX_RETRIES ({llm_max_retries}) must be at most {MAX_RETRIES_LIMIT}");
        }

        let roadmap_weeks: u32 = parse_or(&get, "ROADMAP_WEEKS", DEFAULT_ROADMAP_WEEKS)?;
        if roadmap_weeks == 0 {
            bail!("ROADMAP_WEEKS must be at least 1");
        }

        Ok(Config {
            llm_api_key,
            llm_model: get("LLM_MODEL").unwrap_or_else(|| llm_provider.default_model().to_string()),
            llm_provider,
            llm_endpoint: get("LLM_ENDPOINT"),
            llm_timeout: Duration::from_millis(parse_or(&get, "LLM_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?),
            llm_max_retries,
            llm_retry_base_delay: Duration::from_millis(parse_or(
                &get,
                "LLM_RETRY_BASE_DELAY_MS",
                500,
            )?),
            risk_thresholds,
            roadmap_weeks,
            insight_cache_ttl: Duration::from_secs(parse_or(&get, "INSIGHT_CACHE_TTL_SECS", 300)?),
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
