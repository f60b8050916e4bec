//! Ranked feed pagination against the in-memory store.

mod common;

use std::collections::HashSet;

use agora_core::DomainError;
use agora_core::domain::MAX_FEED_LIMIT;
use common::forum;

const BASE_MILLIS: i64 = 1_700_000_000_000;

#[tokio::test]
async fn test_fifty_one_posts_split_into_two_pages() {
    let forum = forum();
    let alice = forum.user("alice").await;
    for i in 0..51 {
        forum.post_at(&alice, BASE_MILLIS + i * 1_000).await;
    }

    let first = forum.feed.list_posts(50, None).await.unwrap();
    assert_eq!(first.posts.len(), 50);
    assert!(first.has_more);

    let oldest = first.posts.last().unwrap().post.created_at_millis();
    let second = forum
        .feed
        .list_posts(50, Some(&oldest.to_string()))
        .await
        .unwrap();
    assert_eq!(second.posts.len(), 1);
    assert!(!second.has_more);
    assert_eq!(second.posts[0].post.created_at_millis(), BASE_MILLIS);
}

#[tokio::test]
async fn test_feed_is_newest_first_with_creator() {
    let forum = forum();
    let alice = forum.user("alice").await;
    let older = forum.post_at(&alice, BASE_MILLIS).await;
    let newer = forum.post_at(&alice, BASE_MILLIS + 5).await;

    let page = forum.feed.list_posts(10, None).await.unwrap();

    let ids: Vec<_> = page.posts.iter().map(|row| row.post.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert_eq!(page.posts[0].creator, alice);
    assert!(!page.has_more);
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn test_timestamp_cursor_walk_visits_every_post_once() {
    let forum = forum();
    let alice = forum.user("alice").await;
    for i in 0..23 {
        forum.post_at(&alice, BASE_MILLIS + i * 7).await;
    }

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = forum.feed.list_posts(5, cursor.as_deref()).await.unwrap();
        seen.extend(page.posts.iter().map(|row| row.post.id));
        if !page.has_more {
            break;
        }
        cursor = Some(
            page.posts
                .last()
                .unwrap()
                .post
                .created_at_millis()
                .to_string(),
        );
    }

    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 23);
    assert_eq!(unique.len(), 23);
}

#[tokio::test]
async fn test_next_cursor_handles_shared_timestamps() {
    let forum = forum();
    let alice = forum.user("alice").await;
    for _ in 0..7 {
        forum.post_at(&alice, BASE_MILLIS).await;
    }
    forum.post_at(&alice, BASE_MILLIS - 1).await;

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = forum.feed.list_posts(3, cursor.as_deref()).await.unwrap();
        seen.extend(page.posts.iter().map(|row| row.post.id));
        match page.next_cursor {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 8);
    assert_eq!(unique.len(), 8);
}

#[tokio::test]
async fn test_new_posts_between_pages_do_not_shift_results() {
    let forum = forum();
    let alice = forum.user("alice").await;
    for i in 0..6 {
        forum.post_at(&alice, BASE_MILLIS + i).await;
    }

    let first = forum.feed.list_posts(3, None).await.unwrap();
    forum.post_at(&alice, BASE_MILLIS + 100).await;
    let cursor = first.next_cursor.unwrap().to_string();
    let second = forum.feed.list_posts(3, Some(&cursor)).await.unwrap();

    let millis: Vec<_> = second
        .posts
        .iter()
        .map(|row| row.post.created_at_millis() - BASE_MILLIS)
        .collect();
    assert_eq!(millis, vec![2, 1, 0]);
    assert!(!second.has_more);
}

#[tokio::test]
async fn test_limit_is_clamped_to_fifty() {
    let forum = forum();
    let alice = forum.user("alice").await;
    for i in 0..60 {
        forum.post_at(&alice, BASE_MILLIS + i).await;
    }

    let page = forum.feed.list_posts(1000, None).await.unwrap();

    assert_eq!(page.posts.len() as u64, MAX_FEED_LIMIT);
    assert!(page.has_more);
}

#[tokio::test]
async fn test_blank_cursor_starts_from_newest() {
    let forum = forum();
    let alice = forum.user("alice").await;
    let post = forum.post_at(&alice, BASE_MILLIS).await;

    let page = forum.feed.list_posts(10, Some("")).await.unwrap();

    assert_eq!(page.posts[0].post.id, post.id);
}

#[tokio::test]
async fn test_malformed_cursor_is_rejected() {
    let forum = forum();
    forum.store.set_unavailable(true).await;

    let err = forum.feed.list_posts(10, Some("yesterday")).await.unwrap_err();

    assert!(matches!(err, DomainError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_store_outage_is_unavailable() {
    let forum = forum();
    forum.store.set_unavailable(true).await;

    let err = forum.feed.list_posts(10, None).await.unwrap_err();

    assert!(matches!(err, DomainError::Unavailable(_)));
}
