#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use crm::{
    build_schema,
    cadence::{engine, ApplyCadence},
    seed::{seed_crm_demo, SeededCrm},
    Actor, CrmSchema,
};
use entity::lead_cadence;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

pub const ADMIN: &str = "admin@crm.test";
pub const SALES: &str = "sales@crm.test";
pub const SALES2: &str = "sales2@crm.test";
pub const VIEWER: &str = "viewer@crm.test";

pub struct TestCrm {
    pub db: Arc<DatabaseConnection>,
    pub seeded: SeededCrm,
}

impl TestCrm {
    pub async fn new() -> Self {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&conn, None).await.unwrap();
        let seeded = seed_crm_demo(&conn).await.unwrap();
        Self {
            db: Arc::new(conn),
            seeded,
        }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    pub fn schema(&self) -> CrmSchema {
        build_schema(self.db.clone())
    }

    pub fn actor(&self, email: &str) -> Actor {
        let user = self
            .seeded
            .user_email(email)
            .unwrap_or_else(|| panic!("seeded user {email}"));
        Actor::from_user(user)
    }

    pub fn user_id(&self, email: &str) -> uuid::Uuid {
        self.actor(email).user_id
    }

    /// Applies the seeded Outbound-5 cadence to the seeded lead as the lead owner.
    pub async fn apply_outbound(&self, start: NaiveDate) -> lead_cadence::Model {
        engine::apply_cadence_to_lead(
            self.conn(),
            &self.actor(SALES),
            ApplyCadence {
                lead_id: self.seeded.lead.id,
                cadence_id: self.seeded.cadence.id,
                start_date: start,
                notes: Some("primeiro contato".into()),
            },
            at(2024, 1, 1, 8),
        )
        .await
        .unwrap()
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
