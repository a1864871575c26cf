use sea_orm::entity::prelude::*;

/// One row per `<ranking_type>_<YYYY-MM-DD>`; counters only ever grow.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ranking_statistics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "ranking_type")]
    pub ranking_type: String,
    pub date: String,
    #[sea_orm(column_name = "deleted_entries")]
    pub deleted_entries: i64,
    #[sea_orm(column_name = "deleted_score_sum")]
    pub deleted_score_sum: i64,
    pub runs: i64,
    #[sea_orm(column_name = "last_cleanup_at")]
    pub last_cleanup_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
