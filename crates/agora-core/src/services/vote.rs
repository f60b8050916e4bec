//! Vote transition engine.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{PostId, UserId, VoteOutcome, VoteTransition, VoteValue};
use crate::error::{DomainError, RepoError};
use crate::ports::VoteStore;
use crate::retry::RetryPolicy;

/// Casts votes: one ledger write and one score delta per applied vote, in a
/// single transaction.
#[derive(Clone)]
pub struct VoteService {
    store: Arc<dyn VoteStore>,
    retry: RetryPolicy,
}

impl VoteService {
    pub fn new(store: Arc<dyn VoteStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Move `user_id`'s vote on `post_id` to `desired` (`1` or `-1`).
    ///
    /// Re-casting the current direction is a `NoOp`. Aborted transactions are
    /// retried under the configured policy; the decision is re-made from the
    /// ledger on every attempt, so a retry never double-counts.
    #[instrument(skip(self))]
    pub async fn cast_vote(
        &self,
        user_id: UserId,
        post_id: PostId,
        desired: i32,
    ) -> Result<VoteOutcome, DomainError> {
        let desired = VoteValue::try_from(desired)?;
        self.retry
            .run(|attempt| self.try_cast(user_id, post_id, desired, attempt))
            .await
    }

    async fn try_cast(
        &self,
        user_id: UserId,
        post_id: PostId,
        desired: VoteValue,
        attempt: usize,
    ) -> Result<VoteOutcome, DomainError> {
        let mut tx = self.store.begin().await?;

        // Serializes every vote on this post until commit.
        tx.lock_post(post_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "post",
                id: post_id,
            })?;

        let current = tx.get_vote(user_id, post_id).await?;
        let transition = VoteTransition::decide(current, desired);

        let Some(value) = transition.written_value() else {
            debug!(user_id, post_id, attempt, "Vote unchanged");
            return Ok(VoteOutcome::NoOp);
        };

        let delta = transition.points_delta();
        // The post is locked, so a dangling reference can only be the voter.
        tx.upsert_vote(user_id, post_id, value)
            .await
            .map_err(|err| match err {
                RepoError::MissingReference(_) => DomainError::NotFound {
                    entity_type: "user",
                    id: user_id,
                },
                other => other.into(),
            })?;
        tx.add_points(post_id, delta).await?;
        tx.commit().await?;

        debug!(
            user_id,
            post_id,
            attempt,
            ?transition,
            delta,
            "Vote applied"
        );
        Ok(VoteOutcome::Applied { delta })
    }
}
