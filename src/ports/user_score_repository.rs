//! UserScoreRepository port - running per-user scores.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProjectId, UserId};

/// Store of running scores keyed by `(user_id, project_id)`.
///
/// Concurrent invocations may increment the same row. Implementations must
/// use the store's native atomic add so no update is lost; callers never
/// lock.
#[async_trait]
pub trait UserScoreRepository: Send + Sync {
    /// Atomically add `offset` to the user's score and return the new value.
    ///
    /// A missing row (or missing score) starts at zero.
    async fn increment(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        offset: i64,
    ) -> Result<i64, DomainError>;
}
