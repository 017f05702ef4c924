use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job detail database model, one row per submitted item
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub job_id: Uuid,

    /// Submission order
    pub sequence: i32,

    pub item: String,

    pub in_progress: bool,

    /// pending | success | fail | error
    pub status: String,

    pub message: Option<String>,

    pub primary_status: Option<String>,

    pub secondary_status: Option<String>,

    pub pricing_strategy: Option<String>,

    pub transaction_id: Option<String>,

    pub provider_datetime: Option<String>,

    /// Verbatim provider `data`
    pub raw_data: Option<Json>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job::Entity",
        from = "Column::JobId",
        to = "super::job::Column::Id",
        on_delete = "Cascade"
    )]
    Job,
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
