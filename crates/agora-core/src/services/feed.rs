//! Ranked feed paginator.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::{FeedCursor, FeedPage, FeedQuery};
use crate::error::DomainError;
use crate::ports::PostRepository;

/// Serves the public feed, newest first, one keyset page at a time.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// A page of at most `min(limit, 50)` posts past `cursor`.
    ///
    /// An absent or blank cursor starts from the newest post. A cursor that
    /// does not parse is rejected before the store is queried.
    #[instrument(skip(self))]
    pub async fn list_posts(
        &self,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<FeedPage, DomainError> {
        let cursor = cursor
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse::<FeedCursor>)
            .transpose()?;
        let query = FeedQuery::new(limit, cursor);

        let rows = self.posts.list_feed(&query).await?;
        Ok(FeedPage::from_overfetch(rows, query.limit))
    }
}
