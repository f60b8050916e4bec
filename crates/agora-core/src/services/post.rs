//! Post lifecycle around the ledger: lookup, authoring, edits and deletion.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{NewPost, Post, PostId, UserId};
use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository, VoteStore};

/// Post service.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    store: Arc<dyn VoteStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        store: Arc<dyn VoteStore>,
    ) -> Self {
        Self {
            posts,
            users,
            store,
        }
    }

    /// Fetch a single post.
    pub async fn get_post(&self, id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "post",
                id,
            })
    }

    /// Author a post owned by `creator_id`.
    #[instrument(skip(self, text))]
    pub async fn create_post(
        &self,
        creator_id: UserId,
        title: String,
        text: String,
    ) -> Result<Post, DomainError> {
        let new_post = NewPost::new(creator_id, title, text)?;

        if self.users.find_creator(creator_id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity_type: "user",
                id: creator_id,
            });
        }

        let post = self.posts.create(new_post).await?;
        info!(post_id = post.id, creator_id, "Post created");
        Ok(post)
    }

    /// Retitle a post. Only its creator may do so.
    #[instrument(skip(self))]
    pub async fn update_title(
        &self,
        actor: UserId,
        id: PostId,
        title: String,
    ) -> Result<Post, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::InvalidArgument("title must not be empty".into()));
        }

        let post = self.get_post(id).await?;
        if post.creator_id != actor {
            return Err(DomainError::Forbidden);
        }

        self.posts
            .update_title(id, &title)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "post",
                id,
            })
    }

    /// Delete a post and its ledger entries in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, actor: UserId, id: PostId) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await?;

        let post = tx.lock_post(id).await?.ok_or(DomainError::NotFound {
            entity_type: "post",
            id,
        })?;
        if post.creator_id != actor {
            return Err(DomainError::Forbidden);
        }

        let votes = tx.delete_votes_for_post(id).await?;
        tx.delete_post(id).await?;
        tx.commit().await?;

        info!(post_id = id, votes_removed = votes, "Post deleted");
        Ok(())
    }
}
