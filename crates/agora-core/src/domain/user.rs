use serde::{Deserialize, Serialize};

/// Opaque user identifier supplied by the authentication collaborator.
pub type UserId = i64;

/// Read-only projection of a post's creator, joined at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub id: UserId,
    pub username: String,
    pub email: String,
}
