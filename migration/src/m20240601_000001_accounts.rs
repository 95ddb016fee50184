use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
#[sea_orm(iden = "user")]
enum User {
    Table,
    Id,
    Email,
    Name,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
    Name,
    LegalName,
    TaxId,
    Website,
    Email,
    Phone,
    City,
    State,
    Description,
    SourceLeadId,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
    BusinessName,
    LegalName,
    TaxId,
    Website,
    Email,
    Phone,
    City,
    State,
    Description,
    OwnerId,
    ConvertedAt,
    ConvertedToOrganizationId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeadContact {
    Table,
    Id,
    LeadId,
    Name,
    Email,
    Phone,
    JobTitle,
    Linkedin,
    IsPrimary,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Contact {
    Table,
    Id,
    OrganizationId,
    Name,
    Email,
    Phone,
    JobTitle,
    Linkedin,
    IsPrimary,
    SourceLeadContactId,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Partner {
    Table,
    Id,
    Name,
    Website,
    Email,
    Phone,
    Description,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Deal {
    Table,
    Id,
    Title,
    ValueCents,
    Stage,
    OrganizationId,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Activity {
    Table,
    Id,
    Kind,
    Subject,
    Description,
    DueDate,
    Completed,
    CompletedAt,
    LeadId,
    OrganizationId,
    DealId,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(User::Email).string_len(320).not_null())
                    .col(ColumnDef::new(User::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(User::Role)
                            .string_len(16)
                            .not_null()
                            .default("SALES"),
                    )
                    .col(
                        ColumnDef::new(User::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organization::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Organization::Name)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Organization::LegalName).string_len(256))
                    .col(ColumnDef::new(Organization::TaxId).string_len(32))
                    .col(ColumnDef::new(Organization::Website).string_len(512))
                    .col(ColumnDef::new(Organization::Email).string_len(320))
                    .col(ColumnDef::new(Organization::Phone).string_len(64))
                    .col(ColumnDef::new(Organization::City).string_len(128))
                    .col(ColumnDef::new(Organization::State).string_len(64))
                    .col(ColumnDef::new(Organization::Description).text())
                    .col(ColumnDef::new(Organization::SourceLeadId).uuid())
                    .col(ColumnDef::new(Organization::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Organization::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Organization::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_owner")
                            .from(Organization::Table, Organization::OwnerId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Lead::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Lead::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Lead::BusinessName).string_len(256).not_null())
                    .col(ColumnDef::new(Lead::LegalName).string_len(256))
                    .col(ColumnDef::new(Lead::TaxId).string_len(32))
                    .col(ColumnDef::new(Lead::Website).string_len(512))
                    .col(ColumnDef::new(Lead::Email).string_len(320))
                    .col(ColumnDef::new(Lead::Phone).string_len(64))
                    .col(ColumnDef::new(Lead::City).string_len(128))
                    .col(ColumnDef::new(Lead::State).string_len(64))
                    .col(ColumnDef::new(Lead::Description).text())
                    .col(ColumnDef::new(Lead::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Lead::ConvertedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Lead::ConvertedToOrganizationId).uuid())
                    .col(
                        ColumnDef::new(Lead::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Lead::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_owner")
                            .from(Lead::Table, Lead::OwnerId)
                            .to(User::Table, User::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_converted_organization")
                            .from(Lead::Table, Lead::ConvertedToOrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lead_owner")
                    .table(Lead::Table)
                    .col(Lead::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadContact::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeadContact::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeadContact::LeadId).uuid().not_null())
                    .col(ColumnDef::new(LeadContact::Name).string_len(200).not_null())
                    .col(ColumnDef::new(LeadContact::Email).string_len(320))
                    .col(ColumnDef::new(LeadContact::Phone).string_len(64))
                    .col(ColumnDef::new(LeadContact::JobTitle).string_len(128))
                    .col(ColumnDef::new(LeadContact::Linkedin).string_len(512))
                    .col(
                        ColumnDef::new(LeadContact::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LeadContact::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_contact_lead")
                            .from(LeadContact::Table, LeadContact::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lead_contact_lead")
                    .table(LeadContact::Table)
                    .col(LeadContact::LeadId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contact::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contact::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Contact::OrganizationId).uuid())
                    .col(ColumnDef::new(Contact::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Contact::Email).string_len(320))
                    .col(ColumnDef::new(Contact::Phone).string_len(64))
                    .col(ColumnDef::new(Contact::JobTitle).string_len(128))
                    .col(ColumnDef::new(Contact::Linkedin).string_len(512))
                    .col(
                        ColumnDef::new(Contact::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Contact::SourceLeadContactId).uuid())
                    .col(ColumnDef::new(Contact::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Contact::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contact::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_organization")
                            .from(Contact::Table, Contact::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_owner")
                            .from(Contact::Table, Contact::OwnerId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_contact_organization")
                    .table(Contact::Table)
                    .col(Contact::OrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Partner::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Partner::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Partner::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Partner::Website).string_len(512))
                    .col(ColumnDef::new(Partner::Email).string_len(320))
                    .col(ColumnDef::new(Partner::Phone).string_len(64))
                    .col(ColumnDef::new(Partner::Description).text())
                    .col(ColumnDef::new(Partner::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Partner::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Partner::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_partner_owner")
                            .from(Partner::Table, Partner::OwnerId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Deal::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Deal::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Deal::Title).string_len(300).not_null())
                    .col(ColumnDef::new(Deal::ValueCents).big_integer())
                    .col(
                        ColumnDef::new(Deal::Stage)
                            .string_len(32)
                            .not_null()
                            .default("PROSPECTING"),
                    )
                    .col(ColumnDef::new(Deal::OrganizationId).uuid())
                    .col(ColumnDef::new(Deal::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Deal::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deal::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_organization")
                            .from(Deal::Table, Deal::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_owner")
                            .from(Deal::Table, Deal::OwnerId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Activity::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Activity::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Activity::Subject).string_len(300).not_null())
                    .col(ColumnDef::new(Activity::Description).text())
                    .col(ColumnDef::new(Activity::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(Activity::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Activity::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Activity::LeadId).uuid())
                    .col(ColumnDef::new(Activity::OrganizationId).uuid())
                    .col(ColumnDef::new(Activity::DealId).uuid())
                    .col(ColumnDef::new(Activity::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Activity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activity::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_lead")
                            .from(Activity::Table, Activity::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_organization")
                            .from(Activity::Table, Activity::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_deal")
                            .from(Activity::Table, Activity::DealId)
                            .to(Deal::Table, Deal::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_owner")
                            .from(Activity::Table, Activity::OwnerId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_lead")
                    .table(Activity::Table)
                    .col(Activity::LeadId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activity::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deal::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Partner::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contact::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeadContact::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lead::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;
        Ok(())
    }
}
