//! PostgreSQL vote ledger.
//!
//! Each ledger transaction is one `DatabaseTransaction` at READ COMMITTED.
//! `lock_post` takes `SELECT ... FOR UPDATE` on the post row, which queues
//! every other vote on the same post behind this one until commit, and the
//! score moves by `points = points + delta` in SQL rather than from a value
//! read into memory. SeaORM rolls the transaction back if it is dropped
//! uncommitted.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbConn, EntityTrait, IsolationLevel, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};

use agora_core::domain::{PostId, UserId, VoteValue};
use agora_core::error::RepoError;
use agora_core::ports::{LedgerTransaction, LockedPost, VoteStore};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::vote::{self, Entity as VoteEntity};
use super::error::map_db_err;

/// PostgreSQL-backed [`VoteStore`].
pub struct PostgresVoteStore {
    db: DbConn,
}

impl PostgresVoteStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoteStore for PostgresVoteStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, RepoError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
            .await
            .map_err(map_db_err)?;

        Ok(Box::new(PostgresLedgerTransaction { txn }))
    }
}

/// An open ledger transaction.
pub struct PostgresLedgerTransaction {
    txn: DatabaseTransaction,
}

#[async_trait]
impl LedgerTransaction for PostgresLedgerTransaction {
    async fn lock_post(&mut self, post_id: PostId) -> Result<Option<LockedPost>, RepoError> {
        let row = PostEntity::find_by_id(post_id)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(row.map(|post| LockedPost {
            id: post.id,
            creator_id: post.creator_id,
            points: post.points,
        }))
    }

    async fn get_vote(
        &mut self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<Option<VoteValue>, RepoError> {
        let row = VoteEntity::find_by_id((user_id, post_id))
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        row.map(|entry| entry.vote_value()).transpose()
    }

    async fn upsert_vote(
        &mut self,
        user_id: UserId,
        post_id: PostId,
        value: VoteValue,
    ) -> Result<(), RepoError> {
        let entry = vote::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            value: Set(value.as_i32() as i16),
        };

        VoteEntity::insert(entry)
            .on_conflict(
                OnConflict::columns([vote::Column::UserId, vote::Column::PostId])
                    .update_column(vote::Column::Value)
                    .to_owned(),
            )
            .exec_without_returning(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn add_points(&mut self, post_id: PostId, delta: i32) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::Points,
                Expr::col(post::Column::Points).add(delta),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete_votes_for_post(&mut self, post_id: PostId) -> Result<u64, RepoError> {
        let result = VoteEntity::delete_many()
            .filter(vote::Column::PostId.eq(post_id))
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }

    async fn delete_post(&mut self, post_id: PostId) -> Result<bool, RepoError> {
        let result = PostEntity::delete_by_id(post_id)
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        self.txn.commit().await.map_err(map_db_err)
    }
}
