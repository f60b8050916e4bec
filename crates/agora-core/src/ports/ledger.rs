//! Vote ledger port.
//!
//! The ledger never opens transactions of its own. Every read and write goes
//! through a [`LedgerTransaction`] handed out by [`VoteStore::begin`], which
//! also carries the post score update so both commit or neither does.

use async_trait::async_trait;

use crate::domain::{PostId, UserId, VoteValue};
use crate::error::RepoError;

/// Opens units of work over the vote ledger and post scores.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Begin a transaction with at least read-committed isolation.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, RepoError>;
}

/// A post row held under an exclusive lock for the rest of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedPost {
    pub id: PostId,
    pub creator_id: UserId,
    pub points: i32,
}

/// One open transaction. Dropping it without calling [`commit`] rolls back
/// everything written through it.
///
/// [`commit`]: LedgerTransaction::commit
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Lock the post row. `None` if the post does not exist.
    async fn lock_post(&mut self, post_id: PostId) -> Result<Option<LockedPost>, RepoError>;

    /// Current ledger entry for the pair, if any.
    async fn get_vote(
        &mut self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<Option<VoteValue>, RepoError>;

    /// Insert the pair's entry or overwrite its value.
    async fn upsert_vote(
        &mut self,
        user_id: UserId,
        post_id: PostId,
        value: VoteValue,
    ) -> Result<(), RepoError>;

    /// Atomic `points = points + delta` on the post.
    async fn add_points(&mut self, post_id: PostId, delta: i32) -> Result<(), RepoError>;

    /// Remove every ledger entry for the post. Returns how many were removed.
    async fn delete_votes_for_post(&mut self, post_id: PostId) -> Result<u64, RepoError>;

    /// Remove the post row. Returns false if it was already gone.
    async fn delete_post(&mut self, post_id: PostId) -> Result<bool, RepoError>;

    async fn commit(self: Box<Self>) -> Result<(), RepoError>;
}
