use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db;
use crate::models::{Fields, Submission};
use crate::token::Token;

use super::{StoreError, SubmissionStore};

pub struct PgSubmissionStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn insert(
        &self,
        token: &Token,
        primary_payload: &Fields,
    ) -> Result<Submission, StoreError> {
        self.bounded(db::submissions::create(&self.pool, token, primary_payload))
            .await
            .map_err(|err| match err {
                StoreError::Database(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation() =>
                {
                    StoreError::Duplicate(token.clone())
                }
                other => other,
            })
    }

    async fn find(&self, token: &Token) -> Result<Option<Submission>, StoreError> {
        self.bounded(db::submissions::find_by_token(&self.pool, token))
            .await
    }

    async fn update_secondary(
        &self,
        token: &Token,
        payload: &serde_json::Value,
    ) -> Result<u64, StoreError> {
        self.bounded(db::submissions::update_secondary(&self.pool, token, payload))
            .await
    }

    async fn list(&self) -> Result<Vec<Submission>, StoreError> {
        self.bounded(db::submissions::list(&self.pool)).await
    }

    async fn delete(&self, token: &Token) -> Result<bool, StoreError> {
        self.bounded(db::submissions::delete(&self.pool, token)).await
    }
}
