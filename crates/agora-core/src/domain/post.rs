use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;
use crate::error::DomainError;

/// Store-assigned post identifier.
pub type PostId = i64;

/// Number of characters exposed as a post's text snippet in feeds.
pub const SNIPPET_CHARS: usize = 50;

/// Post entity - a forum post and its aggregate vote score.
///
/// `points` is the denormalized sum of every ledger entry for this post. It is
/// only ever changed by a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub creator_id: UserId,
    pub title: String,
    pub text: String,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// First [`SNIPPET_CHARS`] characters of the body.
    pub fn text_snippet(&self) -> &str {
        match self.text.char_indices().nth(SNIPPET_CHARS) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }

    /// Creation time as epoch milliseconds, the unit feed cursors are written in.
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

/// A validated post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub creator_id: UserId,
    pub title: String,
    pub text: String,
    /// Millisecond precision so a cursor taken from this value is exact.
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    /// Create a new post stamped with the current time.
    pub fn new(creator_id: UserId, title: String, text: String) -> Result<Self, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::InvalidArgument("title must not be empty".into()));
        }
        if text.trim().is_empty() {
            return Err(DomainError::InvalidArgument("text must not be empty".into()));
        }
        Ok(Self {
            creator_id,
            title,
            text,
            created_at: Utc::now().trunc_subsecs(3),
        })
    }

    /// Override the creation timestamp (truncated to milliseconds).
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at.trunc_subsecs(3);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_text(text: &str) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            creator_id: 1,
            title: "t".into(),
            text: text.into(),
            points: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_snippet_short_text_is_unchanged() {
        assert_eq!(post_with_text("hello").text_snippet(), "hello");
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let text = "é".repeat(80);
        let post = post_with_text(&text);
        assert_eq!(post.text_snippet().chars().count(), SNIPPET_CHARS);
    }

    #[test]
    fn test_new_post_rejects_blank_title() {
        let err = NewPost::new(1, "   ".into(), "body".into()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn test_new_post_timestamp_has_millisecond_precision() {
        let post = NewPost::new(1, "title".into(), "body".into()).unwrap();
        assert_eq!(post.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
