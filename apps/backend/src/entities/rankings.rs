use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rankings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "user_id")]
    pub user_id: String,
    #[sea_orm(column_name = "display_name")]
    pub display_name: String,
    pub score: i32,
    #[sea_orm(column_name = "correct_answers")]
    pub correct_answers: i32,
    #[sea_orm(column_name = "total_cards")]
    pub total_cards: i32,
    #[sea_orm(column_name = "time_elapsed")]
    pub time_elapsed: i32,
    #[sea_orm(column_name = "ranking_type")]
    pub ranking_type: String,
    #[sea_orm(column_name = "created_at")]
    pub created_at: i64,
    #[sea_orm(column_name = "retention_level")]
    pub retention_level: String,
    pub rank: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
