use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "lead_cadence_activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub lead_cadence_id: Uuid,
    pub cadence_step_id: Uuid,
    #[sea_orm(indexed)]
    pub activity_id: Uuid,
    pub scheduled_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lead_cadence::Entity",
        from = "Column::LeadCadenceId",
        to = "super::lead_cadence::Column::Id",
        on_delete = "Cascade"
    )]
    LeadCadence,
    #[sea_orm(
        belongs_to = "super::cadence_step::Entity",
        from = "Column::CadenceStepId",
        to = "super::cadence_step::Column::Id"
    )]
    CadenceStep,
    #[sea_orm(
        belongs_to = "super::activity::Entity",
        from = "Column::ActivityId",
        to = "super::activity::Column::Id",
        on_delete = "Cascade"
    )]
    Activity,
}

impl Related<super::lead_cadence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeadCadence.def()
    }
}

impl Related<super::cadence_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CadenceStep.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
