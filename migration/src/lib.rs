pub use sea_orm_migration::prelude::*;

mod m20240601_000001_accounts;
mod m20240601_000002_cadences;
mod m20240601_000003_sharing;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_accounts::Migration),
            Box::new(m20240601_000002_cadences::Migration),
            Box::new(m20240601_000003_sharing::Migration),
        ]
    }
}
