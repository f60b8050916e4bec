use async_trait::async_trait;

use crate::domain::{Creator, FeedPost, FeedQuery, NewPost, Post, PostId, UserId};
use crate::error::RepoError;

/// Post store - reads and non-score writes on posts.
///
/// `points` is deliberately absent from every write here; it only changes
/// through a [`LedgerTransaction`](super::LedgerTransaction).
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by its id.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError>;

    /// Store a new post with zero points and return it with its assigned id.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace a post's title. Returns `None` if the post does not exist.
    async fn update_title(&self, id: PostId, title: &str) -> Result<Option<Post>, RepoError>;

    /// Up to `query.fetch_size()` posts past `query.cursor`, ordered by
    /// `created_at` then `id`, both descending, each joined with its creator.
    async fn list_feed(&self, query: &FeedQuery) -> Result<Vec<FeedPost>, RepoError>;
}

/// User lookups needed by the post lifecycle.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the public projection of a user.
    async fn find_creator(&self, id: UserId) -> Result<Option<Creator>, RepoError>;
}
