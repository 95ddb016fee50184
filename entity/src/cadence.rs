use sea_orm::entity::prelude::*;

/// Reusable template of timed touch-points.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cadence")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub duration_days: i32,
    /// Optional Ideal Customer Profile the template targets.
    #[sea_orm(indexed)]
    pub icp_id: Option<Uuid>,
    pub status: Status,
    #[sea_orm(indexed)]
    pub owner_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Step,
    LeadCadence,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Step => Entity::has_many(super::cadence_step::Entity).into(),
            Self::LeadCadence => Entity::has_many(super::lead_cadence::Entity).into(),
        }
    }
}

impl Related<super::cadence_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Step.def()
    }
}

impl Related<super::lead_cadence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeadCadence.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Status {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
}

impl ActiveModelBehavior for ActiveModel {}
