use sea_orm::entity::prelude::*;

/// A cadence template running against one lead.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "lead_cadence")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub lead_id: Uuid,
    #[sea_orm(indexed)]
    pub cadence_id: Uuid,
    pub status: Status,
    pub start_date: Date,
    pub paused_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub current_step: i32,
    pub notes: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lead::Entity",
        from = "Column::LeadId",
        to = "super::lead::Column::Id",
        on_delete = "Cascade"
    )]
    Lead,
    #[sea_orm(
        belongs_to = "super::cadence::Entity",
        from = "Column::CadenceId",
        to = "super::cadence::Column::Id",
        on_delete = "Restrict"
    )]
    Cadence,
    #[sea_orm(has_many = "super::lead_cadence_activity::Entity")]
    ScheduledActivity,
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lead.def()
    }
}

impl Related<super::cadence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cadence.def()
    }
}

impl Related<super::lead_cadence_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduledActivity.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Hash)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Status {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "PAUSED")]
    Paused,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl ActiveModelBehavior for ActiveModel {}
