//! Post and feed handlers.

use actix_web::{HttpResponse, web};

use agora_core::domain::{Creator, FeedPage, FeedPost, Post, PostId};
use agora_shared::dto::{
    CreatePostRequest, CreatorResponse, FeedParams, FeedPostResponse, PaginatedPostsResponse,
    PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Page size when the query string has no `limit`.
const DEFAULT_FEED_LIMIT: i64 = 10;

/// GET /api/posts?limit=&cursor=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<FeedParams>,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let page = state
        .feed
        .list_posts(
            params.limit.unwrap_or(DEFAULT_FEED_LIMIT),
            params.cursor.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(page_response(page)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(&post)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create_post(identity.user_id, req.title, req.text)
        .await?;

    Ok(HttpResponse::Created().json(post_response(&post)))
}

/// PATCH /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update_title(identity.user_id, path.into_inner(), body.into_inner().title)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(&post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete_post(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        creator_id: post.creator_id,
        title: post.title.clone(),
        text: post.text.clone(),
        points: post.points,
        created_at: post.created_at_millis(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

fn creator_response(creator: Creator) -> CreatorResponse {
    CreatorResponse {
        id: creator.id,
        username: creator.username,
        email: creator.email,
    }
}

fn feed_post_response(row: FeedPost) -> FeedPostResponse {
    FeedPostResponse {
        post: post_response(&row.post),
        text_snippet: row.post.text_snippet().to_string(),
        creator: creator_response(row.creator),
    }
}

fn page_response(page: FeedPage) -> PaginatedPostsResponse {
    PaginatedPostsResponse {
        posts: page.posts.into_iter().map(feed_post_response).collect(),
        has_more: page.has_more,
        next_cursor: page.next_cursor.map(|cursor| cursor.to_string()),
    }
}
