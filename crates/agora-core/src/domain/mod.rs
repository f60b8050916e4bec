//! Domain entities - the core business objects.

mod feed;
mod post;
mod user;
mod vote;

pub use feed::{FeedCursor, FeedPage, FeedPost, FeedQuery, MAX_FEED_LIMIT};
pub use post::{NewPost, Post, PostId, SNIPPET_CHARS};
pub use user::{Creator, UserId};
pub use vote::{VoteOutcome, VoteTransition, VoteValue};
