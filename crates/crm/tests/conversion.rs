mod common;

use common::{at, TestCrm, ADMIN, SALES, SALES2, VIEWER};
use crm::{
    conversion::{convert_lead_to_organization, ALREADY_CONVERTED, NO_CONTACTS},
    ApiError,
};
use chrono::Utc;
use entity::{lead, lead_contact};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::test]
async fn conversion_copies_lead_and_contacts() {
    let env = TestCrm::new().await;
    let converted = convert_lead_to_organization(
        env.conn(),
        &env.actor(SALES),
        env.seeded.lead.id,
        at(2024, 4, 1, 12),
    )
    .await
    .unwrap();

    let org = &converted.organization;
    assert_eq!(org.name, "Acme Indústria Ltda");
    assert_eq!(org.tax_id.as_deref(), Some("12.345.678/0001-90"));
    assert_eq!(org.source_lead_id, Some(env.seeded.lead.id));
    assert_eq!(org.owner_id, env.user_id(SALES));

    assert_eq!(converted.contacts.len(), 2);
    assert_eq!(converted.contacts[0].name, "Marina Souza");
    assert!(converted.contacts[0].is_primary);
    for contact in &converted.contacts {
        assert_eq!(contact.organization_id, Some(org.id));
        assert_eq!(contact.owner_id, env.user_id(SALES));
        assert!(contact.source_lead_contact_id.is_some());
    }

    let stored = lead::Entity::find_by_id(env.seeded.lead.id)
        .one(env.conn())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.converted_to_organization_id, Some(org.id));
    assert_eq!(stored.converted_at, Some(at(2024, 4, 1, 12).into()));
}

#[tokio::test]
async fn a_lead_converts_only_once() {
    let env = TestCrm::new().await;
    let admin = env.actor(ADMIN);
    convert_lead_to_organization(env.conn(), &admin, env.seeded.lead.id, at(2024, 4, 1, 12))
        .await
        .unwrap();
    let err =
        convert_lead_to_organization(env.conn(), &admin, env.seeded.lead.id, at(2024, 4, 2, 12))
            .await
            .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(ref msg) if msg == ALREADY_CONVERTED));
}

#[tokio::test]
async fn leads_without_contacts_are_refused() {
    let env = TestCrm::new().await;
    lead_contact::Entity::delete_many()
        .filter(lead_contact::Column::LeadId.eq(env.seeded.lead.id))
        .exec(env.conn())
        .await
        .unwrap();

    let err = convert_lead_to_organization(
        env.conn(),
        &env.actor(SALES),
        env.seeded.lead.id,
        at(2024, 4, 1, 12),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(ref msg) if msg == NO_CONTACTS));

    let stored = lead::Entity::find_by_id(env.seeded.lead.id)
        .one(env.conn())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.converted_at.is_none());
}

#[tokio::test]
async fn conversion_requires_write_access() {
    let env = TestCrm::new().await;
    let err = convert_lead_to_organization(
        env.conn(),
        &env.actor(VIEWER),
        env.seeded.lead.id,
        at(2024, 4, 1, 12),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));

    let err = convert_lead_to_organization(
        env.conn(),
        &env.actor(SALES2),
        env.seeded.lead.id,
        at(2024, 4, 1, 12),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn contacts_follow_the_lead_owner() {
    let env = TestCrm::new().await;
    let now = Utc::now();
    let mut reassigned: lead::ActiveModel = env.seeded.lead.clone().into();
    reassigned.owner_id = Set(env.user_id(SALES2));
    reassigned.updated_at = Set(now.into());
    reassigned.update(env.conn()).await.unwrap();
    lead_contact::ActiveModel {
        id: Set(Uuid::new_v4()),
        lead_id: Set(env.seeded.lead.id),
        name: Set("Paula Nunes".into()),
        email: Set(None),
        phone: Set(Some("+55 11 98888-0000".into())),
        job_title: Set(None),
        linkedin: Set(None),
        is_primary: Set(false),
        created_at: Set(now.into()),
    }
    .insert(env.conn())
    .await
    .unwrap();

    let converted =
        convert_lead_to_organization(env.conn(), &env.actor(ADMIN), env.seeded.lead.id, now)
            .await
            .unwrap();
    assert_eq!(converted.organization.owner_id, env.user_id(SALES2));
    assert_eq!(converted.contacts.len(), 3);
    assert!(converted
        .contacts
        .iter()
        .all(|c| c.owner_id == env.user_id(SALES2)));
}
