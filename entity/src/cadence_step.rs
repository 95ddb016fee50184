use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cadence_step")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub cadence_id: Uuid,
    /// Offset in days from the cadence start date.
    pub day_number: i32,
    pub channel: Channel,
    pub subject: String,
    pub description: Option<String>,
    /// Tie-break among steps sharing a day.
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cadence::Entity",
        from = "Column::CadenceId",
        to = "super::cadence::Column::Id",
        on_delete = "Cascade"
    )]
    Cadence,
}

impl Related<super::cadence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cadence.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Channel {
    #[sea_orm(string_value = "EMAIL")]
    Email,
    #[sea_orm(string_value = "LINKEDIN")]
    Linkedin,
    #[sea_orm(string_value = "WHATSAPP")]
    Whatsapp,
    #[sea_orm(string_value = "CALL")]
    Call,
    #[sea_orm(string_value = "MEETING")]
    Meeting,
    #[sea_orm(string_value = "INSTAGRAM")]
    Instagram,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl ActiveModelBehavior for ActiveModel {}
