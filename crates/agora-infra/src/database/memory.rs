//! In-memory post store and vote ledger - used when no database is configured
//! and as the store behind service tests.
//!
//! A ledger transaction holds the store-wide lock from `begin` until it is
//! committed or dropped, so transactions are fully serialized. Writes made
//! through a transaction are journaled and undone in reverse order if it is
//! dropped without committing.
//! Note: Data is lost on process restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use agora_core::domain::{Creator, FeedPost, FeedQuery, NewPost, Post, PostId, UserId, VoteValue};
use agora_core::error::RepoError;
use agora_core::ports::{
    LedgerTransaction, LockedPost, PostRepository, UserRepository, VoteStore,
};

#[derive(Default)]
struct ForumState {
    users: BTreeMap<UserId, Creator>,
    posts: BTreeMap<PostId, Post>,
    votes: HashMap<(UserId, PostId), VoteValue>,
    last_user_id: UserId,
    last_post_id: PostId,
    // Fault injection for tests.
    failing_commits: u32,
    unavailable: bool,
}

impl ForumState {
    fn check_available(&self) -> Result<(), RepoError> {
        if self.unavailable {
            return Err(RepoError::Connection("in-memory store marked unavailable".into()));
        }
        Ok(())
    }
}

/// In-memory forum store implementing every storage port.
///
/// Cloning is cheap and clones share state, so one store can back the post
/// repository, the user repository and the vote ledger at once.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<ForumState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user. Usernames and emails are unique.
    pub async fn insert_user(&self, username: &str, email: &str) -> Result<Creator, RepoError> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|u| u.username == username || u.email == email)
        {
            return Err(RepoError::Constraint(format!(
                "user {username} <{email}> already exists"
            )));
        }

        state.last_user_id += 1;
        let creator = Creator {
            id: state.last_user_id,
            username: username.to_string(),
            email: email.to_string(),
        };
        state.users.insert(creator.id, creator.clone());
        Ok(creator)
    }

    /// Make the next `count` commits abort with a serialization failure.
    pub async fn fail_next_commits(&self, count: u32) {
        self.state.lock().await.failing_commits = count;
    }

    /// Make every operation fail as if the database were unreachable.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    /// All ledger entries for a post.
    pub async fn votes_for_post(&self, post_id: PostId) -> Vec<(UserId, VoteValue)> {
        let state = self.state.lock().await;
        let mut entries: Vec<_> = state
            .votes
            .iter()
            .filter(|((_, post), _)| *post == post_id)
            .map(|((user, _), value)| (*user, *value))
            .collect();
        entries.sort_by_key(|(user, _)| *user);
        entries
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state.posts.get(&id).cloned())
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut state = self.state.lock().await;
        state.check_available()?;
        if !state.users.contains_key(&post.creator_id) {
            return Err(RepoError::MissingReference(format!(
                "creator {} does not exist",
                post.creator_id
            )));
        }

        state.last_post_id += 1;
        let stored = Post {
            id: state.last_post_id,
            creator_id: post.creator_id,
            title: post.title,
            text: post.text,
            points: 0,
            created_at: post.created_at,
            updated_at: post.created_at,
        };
        state.posts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_title(&self, id: PostId, title: &str) -> Result<Option<Post>, RepoError> {
        let mut state = self.state.lock().await;
        state.check_available()?;
        Ok(state.posts.get_mut(&id).map(|post| {
            post.title = title.to_string();
            post.updated_at = Utc::now().trunc_subsecs(3);
            post.clone()
        }))
    }

    async fn list_feed(&self, query: &FeedQuery) -> Result<Vec<FeedPost>, RepoError> {
        let state = self.state.lock().await;
        state.check_available()?;

        let mut page: Vec<&Post> = state
            .posts
            .values()
            .filter(|post| query.cursor.is_none_or(|cursor| cursor.admits(post)))
            .collect();
        page.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        page.truncate(query.fetch_size() as usize);

        page.into_iter()
            .map(|post| -> Result<FeedPost, RepoError> {
                let creator = state.users.get(&post.creator_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("post {} has no creator row", post.id))
                })?;
                Ok(FeedPost {
                    post: post.clone(),
                    creator,
                })
            })
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_creator(&self, id: UserId) -> Result<Option<Creator>, RepoError> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl VoteStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, RepoError> {
        let state = self.state.clone().lock_owned().await;
        state.check_available()?;

        Ok(Box::new(InMemoryLedgerTransaction {
            state,
            undo: Vec::new(),
            committed: false,
        }))
    }
}

enum Undo {
    Vote {
        key: (UserId, PostId),
        previous: Option<VoteValue>,
    },
    Points {
        post_id: PostId,
        delta: i32,
    },
    Post(Post),
}

/// Transaction over [`InMemoryStore`]; holds the store lock while open.
pub struct InMemoryLedgerTransaction {
    state: OwnedMutexGuard<ForumState>,
    undo: Vec<Undo>,
    committed: bool,
}

impl InMemoryLedgerTransaction {
    fn rollback(&mut self) {
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::Vote { key, previous } => match previous {
                    Some(value) => {
                        self.state.votes.insert(key, value);
                    }
                    None => {
                        self.state.votes.remove(&key);
                    }
                },
                Undo::Points { post_id, delta } => {
                    if let Some(post) = self.state.posts.get_mut(&post_id) {
                        post.points -= delta;
                    }
                }
                Undo::Post(post) => {
                    self.state.posts.insert(post.id, post);
                }
            }
        }
    }
}

impl Drop for InMemoryLedgerTransaction {
    fn drop(&mut self) {
        if !self.committed && !self.undo.is_empty() {
            tracing::debug!(writes = self.undo.len(), "Rolling back in-memory transaction");
            self.rollback();
        }
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn lock_post(&mut self, post_id: PostId) -> Result<Option<LockedPost>, RepoError> {
        Ok(self.state.posts.get(&post_id).map(|post| LockedPost {
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
        Ok(self.state.votes.get(&(user_id, post_id)).copied())
    }

    async fn upsert_vote(
        &mut self,
        user_id: UserId,
        post_id: PostId,
        value: VoteValue,
    ) -> Result<(), RepoError> {
        if !self.state.posts.contains_key(&post_id) {
            return Err(RepoError::MissingReference(format!(
                "post {post_id} does not exist"
            )));
        }
        if !self.state.users.contains_key(&user_id) {
            return Err(RepoError::MissingReference(format!(
                "user {user_id} does not exist"
            )));
        }

        let key = (user_id, post_id);
        let previous = self.state.votes.insert(key, value);
        self.undo.push(Undo::Vote { key, previous });
        Ok(())
    }

    async fn add_points(&mut self, post_id: PostId, delta: i32) -> Result<(), RepoError> {
        let post = self
            .state
            .posts
            .get_mut(&post_id)
            .ok_or(RepoError::NotFound)?;
        // Postgres rejects the same overflow with "integer out of range".
        post.points = post
            .points
            .checked_add(delta)
            .ok_or_else(|| RepoError::Query(format!("points of post {post_id} out of range")))?;
        self.undo.push(Undo::Points { post_id, delta });
        Ok(())
    }

    async fn delete_votes_for_post(&mut self, post_id: PostId) -> Result<u64, RepoError> {
        let keys: Vec<_> = self
            .state
            .votes
            .keys()
            .filter(|(_, post)| *post == post_id)
            .copied()
            .collect();

        for key in &keys {
            let previous = self.state.votes.remove(key);
            self.undo.push(Undo::Vote {
                key: *key,
                previous,
            });
        }
        Ok(keys.len() as u64)
    }

    async fn delete_post(&mut self, post_id: PostId) -> Result<bool, RepoError> {
        match self.state.posts.remove(&post_id) {
            Some(post) => {
                self.undo.push(Undo::Post(post));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        let mut tx = self;
        if tx.state.failing_commits > 0 {
            tx.state.failing_commits -= 1;
            // Dropping `tx` undoes the journal.
            return Err(RepoError::Serialization(
                "could not serialize access due to concurrent update".into(),
            ));
        }

        tx.committed = true;
        tx.undo.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_post() -> (InMemoryStore, Creator, Post) {
        let store = InMemoryStore::new();
        let user = store.insert_user("ann", "ann@example.com").await.unwrap();
        let post = store
            .create(NewPost::new(user.id, "hello".into(), "world".into()).unwrap())
            .await
            .unwrap();
        (store, user, post)
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let (store, user, post) = store_with_post().await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.upsert_vote(user.id, post.id, VoteValue::Up).await.unwrap();
            tx.add_points(post.id, 1).await.unwrap();
        }

        assert!(store.votes_for_post(post.id).await.is_empty());
        assert_eq!(store.find_by_id(post.id).await.unwrap().unwrap().points, 0);
    }

    #[tokio::test]
    async fn test_commit_keeps_writes() {
        let (store, user, post) = store_with_post().await;

        let mut tx = store.begin().await.unwrap();
        tx.upsert_vote(user.id, post.id, VoteValue::Down).await.unwrap();
        tx.add_points(post.id, -1).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            store.votes_for_post(post.id).await,
            vec![(user.id, VoteValue::Down)]
        );
        assert_eq!(store.find_by_id(post.id).await.unwrap().unwrap().points, -1);
    }

    #[tokio::test]
    async fn test_injected_commit_failure_rolls_back() {
        let (store, _, post) = store_with_post().await;
        store.fail_next_commits(1).await;

        let mut tx = store.begin().await.unwrap();
        tx.delete_votes_for_post(post.id).await.unwrap();
        assert!(tx.delete_post(post.id).await.unwrap());
        assert!(matches!(tx.commit().await, Err(RepoError::Serialization(_))));

        assert!(store.find_by_id(post.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_vote_for_unknown_user_is_missing_reference() {
        let (store, _, post) = store_with_post().await;

        let mut tx = store.begin().await.unwrap();
        let err = tx.upsert_vote(9_999, post.id, VoteValue::Up).await.unwrap_err();

        assert!(matches!(err, RepoError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_points_overflow_is_rejected() {
        let (store, _, post) = store_with_post().await;

        let mut tx = store.begin().await.unwrap();
        tx.add_points(post.id, i32::MAX).await.unwrap();
        assert!(matches!(
            tx.add_points(post.id, 2).await,
            Err(RepoError::Query(_))
        ));
        drop(tx);

        assert_eq!(store.find_by_id(post.id).await.unwrap().unwrap().points, 0);
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let store = InMemoryStore::new();
        store.insert_user("ann", "ann@example.com").await.unwrap();
        let err = store.insert_user("ann", "other@example.com").await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_begin() {
        let store = InMemoryStore::new();
        store.set_unavailable(true).await;
        assert!(matches!(store.begin().await, Err(RepoError::Connection(_))));
    }
}
