//! Demo data for local development and tests.
//!
//! Re-running the seed reuses rows that already exist (matched by email,
//! business name or slug).

use chrono::Utc;
use entity::{cadence, cadence_step, lead, lead_contact, user};
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

pub const OUTBOUND_SLUG: &str = "outbound-5";

#[derive(Debug, Clone)]
pub struct SeededCrm {
    pub users: Vec<user::Model>,
    pub lead: lead::Model,
    pub lead_contacts: Vec<lead_contact::Model>,
    pub cadence: cadence::Model,
    pub steps: Vec<cadence_step::Model>,
}

impl SeededCrm {
    pub fn user_email(&self, email: &str) -> Option<&user::Model> {
        self.users.iter().find(|u| u.email == email)
    }
}

const SEED_USERS: [(&str, &str, user::Role); 4] = [
    ("admin@crm.test", "Alice Admin", user::Role::Admin),
    ("sales@crm.test", "Bruno Vendas", user::Role::Sales),
    ("sales2@crm.test", "Carla Vendas", user::Role::Sales),
    ("viewer@crm.test", "Davi Leitor", user::Role::Viewer),
];

const OUTBOUND_STEPS: [(i32, cadence_step::Channel, &str); 3] = [
    (0, cadence_step::Channel::Email, "E-mail de apresentação"),
    (2, cadence_step::Channel::Call, "Ligação de follow-up"),
    (5, cadence_step::Channel::Linkedin, "Conexão no LinkedIn"),
];

pub async fn seed_crm_demo(db: &DatabaseConnection) -> Result<SeededCrm, DbErr> {
    let seeded_at: DateTimeWithTimeZone = Utc::now().into();

    let mut users = Vec::with_capacity(SEED_USERS.len());
    for (email, name, role) in SEED_USERS {
        users.push(insert_seed_user(db, email, name, role, seeded_at).await?);
    }
    let admin_id = users[0].id;
    let sales_id = users[1].id;

    let (lead, lead_contacts) = ensure_demo_lead(db, sales_id, seeded_at).await?;
    let (cadence, steps) = ensure_outbound_cadence(db, admin_id, seeded_at).await?;

    info!(users = users.len(), lead_id = %lead.id, cadence_id = %cadence.id, "demo data seeded");
    Ok(SeededCrm {
        users,
        lead,
        lead_contacts,
        cadence,
        steps,
    })
}

async fn insert_seed_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    role: user::Role,
    now: DateTimeWithTimeZone,
) -> Result<user::Model, DbErr> {
    if let Some(existing) = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
    {
        return Ok(existing);
    }
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

async fn ensure_demo_lead(
    db: &DatabaseConnection,
    owner_id: Uuid,
    now: DateTimeWithTimeZone,
) -> Result<(lead::Model, Vec<lead_contact::Model>), DbErr> {
    const BUSINESS_NAME: &str = "Acme Indústria Ltda";

    if let Some(existing) = lead::Entity::find()
        .filter(lead::Column::BusinessName.eq(BUSINESS_NAME))
        .one(db)
        .await?
    {
        let contacts = lead_contact::Entity::find()
            .filter(lead_contact::Column::LeadId.eq(existing.id))
            .order_by_desc(lead_contact::Column::IsPrimary)
            .all(db)
            .await?;
        return Ok((existing, contacts));
    }

    let lead = lead::ActiveModel {
        id: Set(Uuid::new_v4()),
        business_name: Set(BUSINESS_NAME.into()),
        legal_name: Set(Some("Acme Indústria e Comércio Ltda".into())),
        tax_id: Set(Some("12.345.678/0001-90".into())),
        website: Set(Some("https://acme.test".into())),
        email: Set(Some("contato@acme.test".into())),
        phone: Set(Some("+55 11 4000-0000".into())),
        city: Set(Some("São Paulo".into())),
        state: Set(Some("SP".into())),
        description: Set(Some("Fabricante interessado em automação comercial".into())),
        owner_id: Set(owner_id),
        converted_at: Set(None),
        converted_to_organization_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let people = [
        ("Marina Souza", "marina@acme.test", "Diretora Comercial", true),
        ("Rafael Lima", "rafael@acme.test", "Gerente de TI", false),
    ];
    let mut contacts = Vec::with_capacity(people.len());
    for (name, email, job_title, is_primary) in people {
        let contact = lead_contact::ActiveModel {
            id: Set(Uuid::new_v4()),
            lead_id: Set(lead.id),
            name: Set(name.into()),
            email: Set(Some(email.into())),
            phone: Set(None),
            job_title: Set(Some(job_title.into())),
            linkedin: Set(None),
            is_primary: Set(is_primary),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        contacts.push(contact);
    }
    Ok((lead, contacts))
}

async fn ensure_outbound_cadence(
    db: &DatabaseConnection,
    owner_id: Uuid,
    now: DateTimeWithTimeZone,
) -> Result<(cadence::Model, Vec<cadence_step::Model>), DbErr> {
    if let Some(existing) = cadence::Entity::find()
        .filter(cadence::Column::Slug.eq(OUTBOUND_SLUG))
        .one(db)
        .await?
    {
        let steps = cadence_step::Entity::find()
            .filter(cadence_step::Column::CadenceId.eq(existing.id))
            .order_by_asc(cadence_step::Column::DayNumber)
            .order_by_asc(cadence_step::Column::SortOrder)
            .all(db)
            .await?;
        return Ok((existing, steps));
    }

    let cadence = cadence::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Outbound-5".into()),
        slug: Set(OUTBOUND_SLUG.into()),
        description: Set(Some("Prospecção ativa em três toques".into())),
        objective: Set(Some("Agendar reunião de diagnóstico".into())),
        duration_days: Set(5),
        icp_id: Set(None),
        status: Set(cadence::Status::Active),
        owner_id: Set(owner_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let mut steps = Vec::with_capacity(OUTBOUND_STEPS.len());
    for (order, (day_number, channel, subject)) in OUTBOUND_STEPS.into_iter().enumerate() {
        let step = cadence_step::ActiveModel {
            id: Set(Uuid::new_v4()),
            cadence_id: Set(cadence.id),
            day_number: Set(day_number),
            channel: Set(channel),
            subject: Set(subject.into()),
            description: Set(None),
            sort_order: Set(order as i32),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        steps.push(step);
    }
    Ok((cadence, steps))
}
