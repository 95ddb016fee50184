use sea_orm::entity::prelude::*;

/// Read grant of one entity to a non-owner.
///
/// At most one row exists per `(entity_type, entity_id, shared_with_user_id)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "shared_entity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_type: EntityKind,
    #[sea_orm(indexed)]
    pub entity_id: Uuid,
    #[sea_orm(indexed)]
    pub shared_with_user_id: Uuid,
    pub shared_by_user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    SharedWith,
    SharedBy,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::SharedWith => Entity::belongs_to(super::user::Entity)
                .from(Column::SharedWithUserId)
                .to(super::user::Column::Id)
                .into(),
            Self::SharedBy => Entity::belongs_to(super::user::Entity)
                .from(Column::SharedByUserId)
                .to(super::user::Column::Id)
                .into(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Hash)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum EntityKind {
    #[sea_orm(string_value = "lead")]
    Lead,
    #[sea_orm(string_value = "contact")]
    Contact,
    #[sea_orm(string_value = "organization")]
    Organization,
    #[sea_orm(string_value = "partner")]
    Partner,
    #[sea_orm(string_value = "deal")]
    Deal,
}

impl ActiveModelBehavior for ActiveModel {}
