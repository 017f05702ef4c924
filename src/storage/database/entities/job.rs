use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product vertical identifier (kebab-case)
    pub product: String,

    /// Item count at submission
    pub total: i64,

    /// Success count, written at finalize
    pub success_count: i64,

    /// pending | done | failed
    pub status: String,

    pub owner_id: Uuid,

    pub scope_id: Uuid,

    pub created_at: DateTimeWithTimeZone,

    pub end_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_detail::Entity")]
    JobDetail,
}

impl Related<super::job_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobDetail.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
