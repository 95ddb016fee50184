//! One-shot conversion of a qualified lead into an organization.

use chrono::{DateTime, Utc};
use entity::{contact, lead, lead_contact, organization};
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    access,
    auth::{Actor, UserRole},
};

pub const ALREADY_CONVERTED: &str = "Lead já convertido";
pub const NO_CONTACTS: &str = "Lead sem contatos não pode ser convertido";

#[derive(Debug, Clone)]
pub struct Conversion {
    pub organization: organization::Model,
    pub contacts: Vec<contact::Model>,
}

fn organization_from_lead(
    lead: &lead::Model,
    stamp: DateTimeWithTimeZone,
) -> organization::ActiveModel {
    organization::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(lead.business_name.clone()),
        legal_name: Set(lead.legal_name.clone()),
        tax_id: Set(lead.tax_id.clone()),
        website: Set(lead.website.clone()),
        email: Set(lead.email.clone()),
        phone: Set(lead.phone.clone()),
        city: Set(lead.city.clone()),
        state: Set(lead.state.clone()),
        description: Set(lead.description.clone()),
        source_lead_id: Set(Some(lead.id)),
        owner_id: Set(lead.owner_id),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
}

fn contact_from_lead_contact(
    source: &lead_contact::Model,
    organization_id: Uuid,
    owner_id: Uuid,
    stamp: DateTimeWithTimeZone,
) -> contact::ActiveModel {
    contact::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(Some(organization_id)),
        name: Set(source.name.clone()),
        email: Set(source.email.clone()),
        phone: Set(source.phone.clone()),
        job_title: Set(source.job_title.clone()),
        linkedin: Set(source.linkedin.clone()),
        is_primary: Set(source.is_primary),
        source_lead_contact_id: Set(Some(source.id)),
        owner_id: Set(owner_id),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
}

#[instrument(name = "crm.lead.convert", skip(db, actor, now))]
pub async fn convert_lead_to_organization(
    db: &DatabaseConnection,
    actor: &Actor,
    lead_id: Uuid,
    now: DateTime<Utc>,
) -> ApiResult<Conversion> {
    actor.require(UserRole::Sales)?;
    let txn = db.begin().await?;
    let lead = access::lead_for_write(&txn, actor, lead_id).await?;
    if lead.converted_at.is_some() {
        return Err(ApiError::conflict(ALREADY_CONVERTED));
    }
    let sources = lead_contact::Entity::find()
        .filter(lead_contact::Column::LeadId.eq(lead.id))
        .order_by_desc(lead_contact::Column::IsPrimary)
        .order_by_asc(lead_contact::Column::CreatedAt)
        .all(&txn)
        .await?;
    if sources.is_empty() {
        return Err(ApiError::conflict(NO_CONTACTS));
    }

    let stamp: DateTimeWithTimeZone = now.into();
    let organization = organization_from_lead(&lead, stamp).insert(&txn).await?;
    let mut contacts = Vec::with_capacity(sources.len());
    for source in &sources {
        let created = contact_from_lead_contact(source, organization.id, lead.owner_id, stamp)
            .insert(&txn)
            .await?;
        contacts.push(created);
    }

    let mut converted: lead::ActiveModel = lead.into();
    converted.converted_at = Set(Some(stamp));
    converted.converted_to_organization_id = Set(Some(organization.id));
    converted.updated_at = Set(stamp);
    converted.update(&txn).await?;
    txn.commit().await?;

    info!(organization_id = %organization.id, contacts = contacts.len(), "lead converted");
    Ok(Conversion {
        organization,
        contacts,
    })
}
