use sea_orm::entity::prelude::*;

/// Timestamps are epoch milliseconds; `direction_map` and `cards` hold JSON.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "game_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub mode: String,
    #[sea_orm(column_name = "direction_map", column_type = "Text")]
    pub direction_map: String,
    #[sea_orm(column_type = "Text")]
    pub cards: String,
    #[sea_orm(column_name = "rng_seed")]
    pub rng_seed: i64,
    #[sea_orm(column_name = "max_players", column_type = "SmallInteger")]
    pub max_players: i16,
    #[sea_orm(column_name = "is_active")]
    pub is_active: bool,
    #[sea_orm(column_name = "started_at")]
    pub started_at: i64,
    #[sea_orm(column_name = "last_active_at")]
    pub last_active_at: i64,
    #[sea_orm(column_name = "ended_at")]
    pub ended_at: Option<i64>,
    #[sea_orm(column_name = "lock_version")]
    pub lock_version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session_players::Entity")]
    SessionPlayers,
}

impl Related<super::session_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionPlayers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
