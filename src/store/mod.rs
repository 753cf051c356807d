//! Persistence seam for submissions.
//!
//! Handlers only ever talk to [`SubmissionStore`]; the Postgres and in-memory
//! implementations are chosen at startup.

mod memory;
mod postgres;

pub use memory::MemorySubmissionStore;
pub use postgres::PgSubmissionStore;

use async_trait::async_trait;

use crate::models::{Fields, Submission};
use crate::token::Token;

#[derive(Debug)]
pub enum StoreError {
    /// A submission with this token already exists.
    Duplicate(Token),
    /// The store did not answer within the configured timeout.
    Timeout,
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Duplicate(token) => write!(f, "duplicate submission_id: {token}"),
            StoreError::Timeout => write!(f, "store operation timed out"),
            StoreError::Database(err) => write!(f, "database error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission. Never overwrites an existing token.
    async fn insert(&self, token: &Token, primary_payload: &Fields)
        -> Result<Submission, StoreError>;

    async fn find(&self, token: &Token) -> Result<Option<Submission>, StoreError>;

    /// Replace the secondary payload; returns rows updated (0 when absent).
    async fn update_secondary(
        &self,
        token: &Token,
        payload: &serde_json::Value,
    ) -> Result<u64, StoreError>;

    /// All submissions, newest first.
    async fn list(&self) -> Result<Vec<Submission>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, token: &Token) -> Result<bool, StoreError>;
}
