//! In-Memory User Score Store
//!
//! The increment holds the write lock across read-modify-write, which gives
//! the same no-lost-update guarantee as the real store's atomic add.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ProjectId, UserId};
use crate::domain::scoring::increment;
use crate::ports::UserScoreRepository;

/// In-memory running scores
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserScoreStore {
    scores: Arc<RwLock<HashMap<(UserId, ProjectId), i64>>>,
    fail_increments: Arc<RwLock<bool>>,
}

impl InMemoryUserScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a score directly, bypassing the increment path.
    pub async fn set(&self, user_id: &UserId, project_id: &ProjectId, score: i64) {
        self.scores
            .write()
            .await
            .insert((user_id.clone(), project_id.clone()), score);
    }

    /// Current score, `None` if the row does not exist.
    pub async fn get(&self, user_id: &UserId, project_id: &ProjectId) -> Option<i64> {
        self.scores
            .read()
            .await
            .get(&(user_id.clone(), project_id.clone()))
            .copied()
    }

    /// Make every increment fail with a database error.
    pub async fn fail_increments(&self) {
        *self.fail_increments.write().await = true;
    }

    pub async fn row_count(&self) -> usize {
        self.scores.read().await.len()
    }
}

#[async_trait]
impl UserScoreRepository for InMemoryUserScoreStore {
    async fn increment(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        offset: i64,
    ) -> Result<i64, DomainError> {
        if *self.fail_increments.read().await {
            return Err(DomainError::database("injected increment failure")
                .with_detail("user_id", user_id.as_str()));
        }

        let mut scores = self.scores.write().await;
        let entry = scores
            .entry((user_id.clone(), project_id.clone()))
            .or_insert(0);
        *entry = increment(Some(*entry), offset);
        Ok(*entry)
    }
}
