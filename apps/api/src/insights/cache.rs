//! Insight Cache — memoizes model calls per (template kind, normalized input).
//!
//! Single-flight per key: the first caller runs the producer while holding that
//! key's async lock; concurrent callers for the same key wait on the lock and
//! then read the stored value. The map lock is only held long enough to look up
//! or insert a slot, so different keys never wait on each other.
//! Errors are not cached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use tracing::debug;

use crate::models::profile::{PromptRequest, TemplateKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: TemplateKind,
    input: String,
}

impl CacheKey {
    pub fn new(kind: TemplateKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }

    /// Requests that differ only in skill casing, skill order or surrounding
    /// whitespace share a key.
    pub fn for_request(request: &PromptRequest) -> Self {
        let profile = request.profile();
        let history: Vec<&str> = request.history().iter().map(|u| u.trim()).collect();
        let input = json!({
            "industry": profile.industry.trim().to_lowercase(),
            "skills": profile.normalized_skills(),
            "education_level": profile.education_level.trim().to_lowercase(),
            "target_role": profile.target_role.trim().to_lowercase(),
            "background": profile.background.trim(),
            "history": history,
        });
        Self::new(request.kind(), input.to_string())
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }
}

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

type Slot<T> = Arc<tokio::sync::Mutex<Option<Entry<T>>>>;

pub struct InsightCache<T> {
    slots: Mutex<HashMap<CacheKey, Slot<T>>>,
}

impl<T> Default for InsightCache<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> InsightCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key` if it is younger than its ttl,
    /// otherwise runs `producer` and stores a successful result for `ttl`.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: CacheKey,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let kind = key.kind();
        let slot = self.slot(key);
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.expires_at > Instant::now() {
                debug!("Insight cache hit: kind={}", kind.as_str());
                return Ok(cached.value.clone());
            }
        }

        debug!("Insight cache miss: kind={}", kind.as_str());
        let value = producer().await?;
        *entry = Some(Entry {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        });
        Ok(value)
    }

    /// Drops the entry for `key`, forcing the next access to recompute.
    pub fn invalidate(&self, key: &CacheKey) {
        if self.lock_slots().remove(key).is_some() {
            debug!("Insight cache invalidated: kind={}", key.kind().as_str());
        }
    }

    /// Removes expired and empty slots. A slot another caller still holds is
    /// kept, whether its producer is running or the caller has not locked it yet.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.lock_slots();
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and(|e| e.expires_at > now),
                Err(_) => true,
            }
        });
        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: CacheKey) -> Slot<T> {
        self.lock_slots().entry(key).or_default().clone()
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
