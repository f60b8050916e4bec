//! Vote handler.

use actix_web::{HttpResponse, web};

use agora_core::domain::PostId;
use agora_shared::dto::{VoteRequest, VoteResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/vote
///
/// Repeating the caller's current direction answers `applied: false`.
pub async fn cast_vote(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
    body: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .votes
        .cast_vote(identity.user_id, path.into_inner(), body.value)
        .await?;

    Ok(HttpResponse::Ok().json(VoteResponse {
        applied: outcome.is_applied(),
        delta: outcome.delta(),
    }))
}
