use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::models::{Fields, Submission};
use crate::token::Token;

use super::{StoreError, SubmissionStore};

/// Process-local store for tests and database-less local runs.
#[derive(Default)]
pub struct MemorySubmissionStore {
    /// token -> (insertion sequence, submission)
    entries: DashMap<Token, (u64, Submission)>,
    next_seq: AtomicU64,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn insert(
        &self,
        token: &Token,
        primary_payload: &Fields,
    ) -> Result<Submission, StoreError> {
        match self.entries.entry(token.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(token.clone())),
            Entry::Vacant(slot) => {
                let submission = Submission {
                    token: token.clone(),
                    primary_payload: primary_payload.clone(),
                    secondary_payload: None,
                    created_at: Utc::now(),
                };
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, submission.clone()));
                Ok(submission)
            }
        }
    }

    async fn find(&self, token: &Token) -> Result<Option<Submission>, StoreError> {
        Ok(self.entries.get(token).map(|entry| entry.value().1.clone()))
    }

    async fn update_secondary(
        &self,
        token: &Token,
        payload: &serde_json::Value,
    ) -> Result<u64, StoreError> {
        match self.entries.get_mut(token) {
            Some(mut entry) => {
                entry.value_mut().1.secondary_payload = Some(payload.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list(&self) -> Result<Vec<Submission>, StoreError> {
        let mut rows: Vec<(u64, Submission)> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
        });
        Ok(rows.into_iter().map(|(_, submission)| submission).collect())
    }

    async fn delete(&self, token: &Token) -> Result<bool, StoreError> {
        Ok(self.entries.remove(token).is_some())
    }
}
