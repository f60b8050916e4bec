//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedParams {
    pub limit: Option<i64>,
    /// Epoch milliseconds of the last post seen, or a `next_cursor` value.
    pub cursor: Option<String>,
}

/// Request to author a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
}

/// Request to retitle a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
}

/// Request to cast a vote; `value` must be `1` or `-1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub value: i32,
}

/// Result of a vote cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    /// False when the vote repeated the current direction.
    pub applied: bool,
    /// Change applied to the post's points.
    pub delta: i32,
}

/// Public projection of a post's creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// A post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub text: String,
    pub points: i32,
    /// Epoch milliseconds, the unit feed cursors are written in.
    pub created_at: i64,
    pub updated_at: String,
}

/// A post as listed in the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPostResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub text_snippet: String,
    pub creator: CreatorResponse,
}

/// One page of the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedPostsResponse {
    pub posts: Vec<FeedPostResponse>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
