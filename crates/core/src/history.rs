//! Bounded, most-recent-first history of generation results for one
//! session, with a single "active" selection.

use std::collections::VecDeque;

use crate::error::CoreError;
use crate::generation::GenerationResult;
use crate::types::JobId;

/// Default number of results kept per session.
pub const DEFAULT_HISTORY_CAP: usize = 10;

/// In-memory history store. Single owner, no locking.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<GenerationResult>,
    capacity: usize,
    active: Option<JobId>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAP)
    }
}

impl HistoryStore {
    /// Create a store keeping at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            active: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend `result`, evicting the oldest entries beyond the cap.
    ///
    /// If the active entry is evicted the active pointer is cleared.
    pub fn append(&mut self, result: GenerationResult) {
        self.entries.push_front(result);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                if self.active.as_deref() == Some(evicted.job_id.as_str()) {
                    self.active = None;
                }
            }
        }
    }

    /// Make `job_id` the active entry.
    ///
    /// Unknown ids return [`CoreError::NotFound`] and leave the current
    /// selection untouched.
    pub fn select(&mut self, job_id: &str) -> Result<&GenerationResult, CoreError> {
        let idx = self
            .entries
            .iter()
            .position(|r| r.job_id == job_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "generation",
                id: job_id.to_string(),
            })?;
        self.active = Some(job_id.to_string());
        Ok(&self.entries[idx])
    }

    pub fn active(&self) -> Option<&GenerationResult> {
        let id = self.active.as_deref()?;
        self.entries.iter().find(|r| r.job_id == id)
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    pub fn get(&self, job_id: &str) -> Option<&GenerationResult> {
        self.entries.iter().find(|r| r.job_id == job_id)
    }

    /// Entries, most recent first.
    pub fn list(&self) -> impl Iterator<Item = &GenerationResult> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::generation::GenerationParameters;

    fn result(job_id: &str) -> GenerationResult {
        GenerationResult {
            job_id: job_id.into(),
            success: true,
            prompt_used: format!("prompt for {job_id}"),
            antigravity_params: GenerationParameters::default(),
            audio_reference: format!("http://localhost:8000/api/audio/{job_id}.wav"),
            error: None,
            seed: None,
            lyrics_used: None,
            duration_seconds: Some(60),
            received_at: chrono::Utc::now(),
        }
    }

    fn ids(store: &HistoryStore) -> Vec<String> {
        store.list().map(|r| r.job_id.clone()).collect()
    }

    #[test]
    fn append_prepends_most_recent() {
        let mut store = HistoryStore::with_capacity(3);
        store.append(result("a"));
        store.append(result("b"));
        assert_eq!(ids(&store), vec!["b", "a"]);
    }

    #[test]
    fn overflow_drops_exactly_the_oldest() {
        let cap = 4;
        let mut store = HistoryStore::with_capacity(cap);
        for i in 0..=cap {
            store.append(result(&format!("job_{i}")));
        }
        assert_eq!(store.len(), cap);
        assert_eq!(ids(&store), vec!["job_4", "job_3", "job_2", "job_1"]);
    }

    #[test]
    fn select_sets_active() {
        let mut store = HistoryStore::default();
        store.append(result("a"));
        store.append(result("b"));
        assert_eq!(store.select("a").unwrap().job_id, "a");
        assert_eq!(store.active().map(|r| r.job_id.as_str()), Some("a"));
    }

    #[test]
    fn select_unknown_keeps_current_selection() {
        let mut store = HistoryStore::default();
        store.append(result("a"));
        store.select("a").unwrap();

        assert_matches!(store.select("zzz"), Err(CoreError::NotFound { entity: "generation", .. }));
        assert_eq!(store.active().map(|r| r.job_id.as_str()), Some("a"));
    }

    #[test]
    fn evicting_active_entry_clears_pointer() {
        let mut store = HistoryStore::with_capacity(2);
        store.append(result("a"));
        store.select("a").unwrap();
        store.append(result("b"));
        store.append(result("c"));
        assert!(store.active().is_none());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut store = HistoryStore::with_capacity(0);
        store.append(result("a"));
        store.append(result("b"));
        assert_eq!(store.capacity(), 1);
        assert_eq!(ids(&store), vec!["b"]);
    }
}
