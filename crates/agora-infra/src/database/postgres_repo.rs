//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use agora_core::domain::{Creator, FeedPost, FeedQuery, NewPost, Post, PostId, UserId};
use agora_core::error::RepoError;
use agora_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::Entity as UserEntity;
use super::error::map_db_err;

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    pub(crate) db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Feed filter for a cursor: rows strictly after it in
/// `(created_at DESC, id DESC)` order.
fn cursor_condition(query: &FeedQuery) -> Condition {
    let Some(cursor) = query.cursor else {
        return Condition::all();
    };
    let boundary: sea_orm::prelude::DateTimeWithTimeZone = cursor.created_at.into();

    match cursor.last_id {
        None => Condition::all().add(post::Column::CreatedAt.lt(boundary)),
        Some(last_id) => Condition::any()
            .add(post::Column::CreatedAt.lt(boundary))
            .add(
                Condition::all()
                    .add(post::Column::CreatedAt.eq(boundary))
                    .add(post::Column::Id.lt(last_id)),
            ),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = post.into();
        let model = active_model.insert(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update_title(&self, id: PostId, title: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Title, Expr::value(title))
            .col_expr(post::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn list_feed(&self, query: &FeedQuery) -> Result<Vec<FeedPost>, RepoError> {
        tracing::debug!(
            limit = query.limit,
            cursor = ?query.cursor.map(|c| c.to_string()),
            "Loading feed page"
        );

        let rows = PostEntity::find()
            .filter(cursor_condition(query))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(query.fetch_size())
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(post, creator)| -> Result<FeedPost, RepoError> {
                let creator = creator.ok_or_else(|| {
                    RepoError::Query(format!("post {} has no creator row", post.id))
                })?;
                Ok(FeedPost {
                    post: post.into(),
                    creator: creator.into(),
                })
            })
            .collect()
    }
}

/// PostgreSQL user lookups.
pub struct PostgresUserRepository {
    pub(crate) db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_creator(&self, id: UserId) -> Result<Option<Creator>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}
