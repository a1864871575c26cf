use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "matchmaking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "session_id")]
    pub session_id: String,
    #[sea_orm(column_name = "creator_id")]
    pub creator_id: String,
    #[sea_orm(column_name = "player_count", column_type = "SmallInteger")]
    pub player_count: i16,
    #[sea_orm(column_name = "max_players", column_type = "SmallInteger")]
    pub max_players: i16,
    pub status: String,
    #[sea_orm(column_name = "created_at")]
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
