#![allow(dead_code)]

use std::sync::Arc;

use chrono::DateTime;

use agora_core::domain::{Creator, NewPost, Post};
use agora_core::ports::PostRepository;
use agora_core::{FeedService, PostService, RetryPolicy, VoteService};
use agora_infra::InMemoryStore;

/// Services wired to one shared in-memory store.
pub struct Forum {
    pub store: InMemoryStore,
    pub votes: VoteService,
    pub feed: FeedService,
    pub posts: PostService,
}

pub fn forum() -> Forum {
    forum_with_retry(RetryPolicy::immediate(3))
}

pub fn forum_with_retry(retry: RetryPolicy) -> Forum {
    let store = InMemoryStore::new();
    let shared = Arc::new(store.clone());

    Forum {
        votes: VoteService::new(shared.clone(), retry),
        feed: FeedService::new(shared.clone()),
        posts: PostService::new(shared.clone(), shared.clone(), shared),
        store,
    }
}

impl Forum {
    pub async fn user(&self, name: &str) -> Creator {
        self.store
            .insert_user(name, &format!("{name}@example.com"))
            .await
            .unwrap()
    }

    /// Store a post stamped at `millis` since the epoch.
    pub async fn post_at(&self, creator: &Creator, millis: i64) -> Post {
        let post = NewPost::new(creator.id, format!("post at {millis}"), "body".into())
            .unwrap()
            .created_at(DateTime::from_timestamp_millis(millis).unwrap());
        self.store.create(post).await.unwrap()
    }

    pub async fn points(&self, post: &Post) -> i32 {
        self.store.find_by_id(post.id).await.unwrap().unwrap().points
    }

    pub async fn ledger_sum(&self, post: &Post) -> i32 {
        self.store
            .votes_for_post(post.id)
            .await
            .iter()
            .map(|(_, value)| value.as_i32())
            .sum()
    }
}
