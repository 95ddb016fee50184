use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
#[sea_orm(iden = "user")]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Activity {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Cadence {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Objective,
    DurationDays,
    IcpId,
    Status,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CadenceStep {
    Table,
    Id,
    CadenceId,
    DayNumber,
    Channel,
    Subject,
    Description,
    SortOrder,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LeadCadence {
    Table,
    Id,
    LeadId,
    CadenceId,
    Status,
    StartDate,
    PausedAt,
    CompletedAt,
    CancelledAt,
    CurrentStep,
    Notes,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeadCadenceActivity {
    Table,
    Id,
    LeadCadenceId,
    CadenceStepId,
    ActivityId,
    ScheduledDate,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cadence::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cadence::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Cadence::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Cadence::Slug).string_len(200).not_null())
                    .col(ColumnDef::new(Cadence::Description).text())
                    .col(ColumnDef::new(Cadence::Objective).text())
                    .col(
                        ColumnDef::new(Cadence::DurationDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Cadence::IcpId).uuid())
                    .col(
                        ColumnDef::new(Cadence::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(ColumnDef::new(Cadence::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Cadence::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cadence::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cadence_owner")
                            .from(Cadence::Table, Cadence::OwnerId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cadence_slug")
                    .table(Cadence::Table)
                    .col(Cadence::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CadenceStep::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CadenceStep::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CadenceStep::CadenceId).uuid().not_null())
                    .col(ColumnDef::new(CadenceStep::DayNumber).integer().not_null())
                    .col(ColumnDef::new(CadenceStep::Channel).string_len(16).not_null())
                    .col(ColumnDef::new(CadenceStep::Subject).string_len(300).not_null())
                    .col(ColumnDef::new(CadenceStep::Description).text())
                    .col(
                        ColumnDef::new(CadenceStep::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CadenceStep::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cadence_step_cadence")
                            .from(CadenceStep::Table, CadenceStep::CadenceId)
                            .to(Cadence::Table, Cadence::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cadence_step_order")
                    .table(CadenceStep::Table)
                    .col(CadenceStep::CadenceId)
                    .col(CadenceStep::DayNumber)
                    .col(CadenceStep::SortOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadCadence::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeadCadence::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeadCadence::LeadId).uuid().not_null())
                    .col(ColumnDef::new(LeadCadence::CadenceId).uuid().not_null())
                    .col(
                        ColumnDef::new(LeadCadence::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(ColumnDef::new(LeadCadence::StartDate).date().not_null())
                    .col(ColumnDef::new(LeadCadence::PausedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(LeadCadence::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(LeadCadence::CancelledAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(LeadCadence::CurrentStep)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LeadCadence::Notes).text())
                    .col(ColumnDef::new(LeadCadence::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(LeadCadence::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeadCadence::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_cadence_lead")
                            .from(LeadCadence::Table, LeadCadence::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_cadence_cadence")
                            .from(LeadCadence::Table, LeadCadence::CadenceId)
                            .to(Cadence::Table, Cadence::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_cadence_owner")
                            .from(LeadCadence::Table, LeadCadence::OwnerId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lead_cadence_lead_cadence")
                    .table(LeadCadence::Table)
                    .col(LeadCadence::LeadId)
                    .col(LeadCadence::CadenceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadCadenceActivity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeadCadenceActivity::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LeadCadenceActivity::LeadCadenceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeadCadenceActivity::CadenceStepId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeadCadenceActivity::ActivityId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeadCadenceActivity::ScheduledDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeadCadenceActivity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lca_lead_cadence")
                            .from(LeadCadenceActivity::Table, LeadCadenceActivity::LeadCadenceId)
                            .to(LeadCadence::Table, LeadCadence::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lca_cadence_step")
                            .from(LeadCadenceActivity::Table, LeadCadenceActivity::CadenceStepId)
                            .to(CadenceStep::Table, CadenceStep::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lca_activity")
                            .from(LeadCadenceActivity::Table, LeadCadenceActivity::ActivityId)
                            .to(Activity::Table, Activity::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lca_lead_cadence")
                    .table(LeadCadenceActivity::Table)
                    .col(LeadCadenceActivity::LeadCadenceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lca_activity")
                    .table(LeadCadenceActivity::Table)
                    .col(LeadCadenceActivity::ActivityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeadCadenceActivity::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeadCadence::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CadenceStep::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cadence::Table).to_owned())
            .await?;
        Ok(())
    }
}
