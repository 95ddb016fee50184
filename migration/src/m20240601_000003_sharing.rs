use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
#[sea_orm(iden = "user")]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SharedEntity {
    Table,
    Id,
    EntityType,
    EntityId,
    SharedWithUserId,
    SharedByUserId,
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
                    .table(SharedEntity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SharedEntity::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SharedEntity::EntityType).string_len(16).not_null())
                    .col(ColumnDef::new(SharedEntity::EntityId).uuid().not_null())
                    .col(
                        ColumnDef::new(SharedEntity::SharedWithUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedEntity::SharedByUserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedEntity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shared_entity_with_user")
                            .from(SharedEntity::Table, SharedEntity::SharedWithUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shared_entity_by_user")
                            .from(SharedEntity::Table, SharedEntity::SharedByUserId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Entity ids point into five different tables, so no foreign key on entity_id.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shared_entity_unique")
                    .table(SharedEntity::Table)
                    .col(SharedEntity::EntityType)
                    .col(SharedEntity::EntityId)
                    .col(SharedEntity::SharedWithUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shared_entity_user")
                    .table(SharedEntity::Table)
                    .col(SharedEntity::SharedWithUserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SharedEntity::Table).to_owned())
            .await?;
        Ok(())
    }
}
