use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "session_players")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "session_id")]
    pub session_id: String,
    pub uid: String,
    #[sea_orm(column_name = "display_name")]
    pub display_name: String,
    pub score: i32,
    #[sea_orm(column_type = "SmallInteger")]
    pub progress: i16,
    #[sea_orm(column_name = "card_index")]
    pub card_index: i32,
    #[sea_orm(column_name = "is_complete")]
    pub is_complete: bool,
    #[sea_orm(column_name = "joined_at")]
    pub joined_at: i64,
    #[sea_orm(column_name = "finished_at")]
    pub finished_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::game_sessions::Entity",
        from = "Column::SessionId",
        to = "super::game_sessions::Column::Id",
        on_delete = "Cascade"
    )]
    GameSession,
}

impl Related<super::game_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
