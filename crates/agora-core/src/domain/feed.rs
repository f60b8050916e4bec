//! Keyset pagination over the post feed.
//!
//! The feed is ordered by `created_at` descending with `id` descending as the
//! tie-break. A cursor names the position of the last post on the previous
//! page; the next page holds only posts strictly after it in that order, so
//! posts inserted between fetches never shift later pages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::post::{Post, PostId};
use super::user::Creator;
use crate::error::DomainError;

/// Upper bound on posts per page, applied whatever the caller asks for.
pub const MAX_FEED_LIMIT: u64 = 50;

/// A post joined with its creator's projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    pub post: Post,
    pub creator: Creator,
}

/// Position in the feed.
///
/// Written as `"<epoch_ms>"` or `"<epoch_ms>:<id>"`. The bare timestamp form
/// selects posts with `created_at < epoch_ms` and can skip posts that share a
/// timestamp with the boundary. The second form also carries the boundary
/// post's id and selects `(created_at, id) < (epoch_ms, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub last_id: Option<PostId>,
}

impl FeedCursor {
    /// Timestamp-only cursor.
    pub fn before(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            last_id: None,
        }
    }

    /// Cursor positioned just after `post`.
    pub fn after(post: &Post) -> Self {
        Self {
            created_at: post.created_at,
            last_id: Some(post.id),
        }
    }

    /// Whether `post` lies strictly past this cursor in feed order.
    pub fn admits(&self, post: &Post) -> bool {
        match self.last_id {
            None => post.created_at < self.created_at,
            Some(last_id) => {
                post.created_at < self.created_at
                    || (post.created_at == self.created_at && post.id < last_id)
            }
        }
    }
}

impl FromStr for FeedCursor {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidArgument(format!("malformed feed cursor: {raw:?}"));

        let (millis, last_id) = match raw.trim().split_once(':') {
            Some((millis, id)) => (millis, Some(id.parse::<PostId>().map_err(|_| invalid())?)),
            None => (raw.trim(), None),
        };
        let millis: i64 = millis.parse().map_err(|_| invalid())?;
        let created_at = DateTime::from_timestamp_millis(millis).ok_or_else(invalid)?;

        Ok(Self {
            created_at,
            last_id,
        })
    }
}

impl fmt::Display for FeedCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_id {
            Some(id) => write!(f, "{}:{}", self.created_at.timestamp_millis(), id),
            None => write!(f, "{}", self.created_at.timestamp_millis()),
        }
    }
}

/// A normalized feed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// Page size, already clamped to `1..=MAX_FEED_LIMIT`.
    pub limit: u64,
    pub cursor: Option<FeedCursor>,
}

impl FeedQuery {
    pub fn new(requested_limit: i64, cursor: Option<FeedCursor>) -> Self {
        let limit = requested_limit.clamp(1, MAX_FEED_LIMIT as i64) as u64;
        Self { limit, cursor }
    }

    /// Rows to ask the store for: one past the page to learn whether more exist.
    pub fn fetch_size(&self) -> u64 {
        self.limit + 1
    }
}

/// One page of the feed.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub has_more: bool,
    /// Tie-safe cursor for the following page, present when `has_more`.
    pub next_cursor: Option<FeedCursor>,
}

impl FeedPage {
    /// Build a page from an over-fetched, already ordered row set.
    pub fn from_overfetch(mut rows: Vec<FeedPost>, limit: u64) -> Self {
        let has_more = rows.len() as u64 > limit;
        rows.truncate(limit as usize);
        let next_cursor = if has_more {
            rows.last().map(|row| FeedCursor::after(&row.post))
        } else {
            None
        };
        Self {
            posts: rows,
            has_more,
            next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_at(id: PostId, millis: i64) -> Post {
        let at = DateTime::from_timestamp_millis(millis).unwrap();
        Post {
            id,
            creator_id: 1,
            title: format!("post {id}"),
            text: "body".into(),
            points: 0,
            created_at: at,
            updated_at: at,
        }
    }

    fn feed_post(id: PostId, millis: i64) -> FeedPost {
        FeedPost {
            post: post_at(id, millis),
            creator: Creator {
                id: 1,
                username: "ann".into(),
                email: "ann@example.com".into(),
            },
        }
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(FeedQuery::new(1000, None).limit, MAX_FEED_LIMIT);
        assert_eq!(FeedQuery::new(0, None).limit, 1);
        assert_eq!(FeedQuery::new(-5, None).limit, 1);
        assert_eq!(FeedQuery::new(10, None).fetch_size(), 11);
    }

    #[test]
    fn test_parse_timestamp_cursor() {
        let cursor: FeedCursor = "1700000000123".parse().unwrap();
        assert_eq!(cursor.created_at.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(cursor.last_id, None);
        assert_eq!(cursor.to_string(), "1700000000123");
    }

    #[test]
    fn test_parse_tie_safe_cursor() {
        let cursor: FeedCursor = "1700000000123:42".parse().unwrap();
        assert_eq!(cursor.last_id, Some(42));
        assert_eq!(cursor.to_string(), "1700000000123:42");
    }

    #[test]
    fn test_malformed_cursor_is_invalid_argument() {
        for raw in ["", "abc", "12:x", "1.5", "99999999999999999999"] {
            assert!(
                matches!(raw.parse::<FeedCursor>(), Err(DomainError::InvalidArgument(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_timestamp_cursor_excludes_boundary() {
        let cursor = FeedCursor::before(post_at(5, 1000).created_at);
        assert!(!cursor.admits(&post_at(5, 1000)));
        assert!(!cursor.admits(&post_at(4, 1000)));
        assert!(cursor.admits(&post_at(3, 999)));
    }

    #[test]
    fn test_tie_safe_cursor_breaks_ties_by_id() {
        let cursor = FeedCursor::after(&post_at(5, 1000));
        assert!(!cursor.admits(&post_at(5, 1000)));
        assert!(!cursor.admits(&post_at(6, 1000)));
        assert!(cursor.admits(&post_at(4, 1000)));
        assert!(cursor.admits(&post_at(9, 999)));
    }

    #[test]
    fn test_overfetch_sets_has_more_and_truncates() {
        let rows: Vec<_> = (0..4).map(|i| feed_post(10 - i, 5000 - i)).collect();
        let page = FeedPage::from_overfetch(rows, 3);
        assert!(page.has_more);
        assert_eq!(page.posts.len(), 3);
        assert_eq!(page.next_cursor, Some(FeedCursor::after(&page.posts[2].post)));
    }

    #[test]
    fn test_short_page_has_no_more() {
        let rows: Vec<_> = (0..3).map(|i| feed_post(10 - i, 5000 - i)).collect();
        let page = FeedPage::from_overfetch(rows, 3);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }
}
