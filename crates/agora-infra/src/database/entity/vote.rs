//! Vote ledger entity for SeaORM.

use sea_orm::entity::prelude::*;

use agora_core::domain::VoteValue;
use agora_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: i64,
    pub value: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stored value as a domain vote. The column is constrained to ±1, so any
    /// other value means the table was written around the ledger.
    pub fn vote_value(&self) -> Result<VoteValue, RepoError> {
        VoteValue::try_from(i32::from(self.value)).map_err(|_| {
            RepoError::Query(format!(
                "corrupt ledger entry ({}, {}): value {}",
                self.user_id, self.post_id, self.value
            ))
        })
    }
}
