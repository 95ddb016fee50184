//! Ownership of the five shareable record kinds.
//!
//! Each kind resolves to one static [`OwnershipAccess`] so callers never
//! branch on the kind themselves.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entity::{contact, deal, lead, organization, partner, shared_entity, user};
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ColumnTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Actor;

pub use entity::shared_entity::EntityKind;

pub const ENTITY_NOT_FOUND: &str = "Entidade não encontrada";
pub const USER_NOT_FOUND: &str = "Usuário não encontrado";
pub const TRANSFERRED: &str = "Entidade transferida com sucesso";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
}

impl OperationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait OwnershipAccess: Send + Sync {
    async fn find_owner(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<Option<Uuid>, DbErr>;

    /// Returns the number of rows changed.
    async fn set_owner(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        owner_id: Uuid,
        now: DateTimeWithTimeZone,
    ) -> Result<u64, DbErr>;
}

struct OwnerColumns<E: EntityTrait> {
    id: E::Column,
    owner: E::Column,
    updated_at: E::Column,
    entity: PhantomData<fn() -> E>,
}

#[async_trait]
impl<E> OwnershipAccess for OwnerColumns<E>
where
    E: EntityTrait,
{
    async fn find_owner(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<Option<Uuid>, DbErr> {
        E::find()
            .select_only()
            .column(self.owner)
            .filter(self.id.eq(id))
            .into_tuple::<Uuid>()
            .one(txn)
            .await
    }

    async fn set_owner(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        owner_id: Uuid,
        now: DateTimeWithTimeZone,
    ) -> Result<u64, DbErr> {
        let result = E::update_many()
            .col_expr(self.owner, Expr::value(owner_id))
            .col_expr(self.updated_at, Expr::value(now))
            .filter(self.id.eq(id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }
}

static LEADS: OwnerColumns<lead::Entity> = OwnerColumns {
    id: lead::Column::Id,
    owner: lead::Column::OwnerId,
    updated_at: lead::Column::UpdatedAt,
    entity: PhantomData,
};

static CONTACTS: OwnerColumns<contact::Entity> = OwnerColumns {
    id: contact::Column::Id,
    owner: contact::Column::OwnerId,
    updated_at: contact::Column::UpdatedAt,
    entity: PhantomData,
};

static ORGANIZATIONS: OwnerColumns<organization::Entity> = OwnerColumns {
    id: organization::Column::Id,
    owner: organization::Column::OwnerId,
    updated_at: organization::Column::UpdatedAt,
    entity: PhantomData,
};

static PARTNERS: OwnerColumns<partner::Entity> = OwnerColumns {
    id: partner::Column::Id,
    owner: partner::Column::OwnerId,
    updated_at: partner::Column::UpdatedAt,
    entity: PhantomData,
};

static DEALS: OwnerColumns<deal::Entity> = OwnerColumns {
    id: deal::Column::Id,
    owner: deal::Column::OwnerId,
    updated_at: deal::Column::UpdatedAt,
    entity: PhantomData,
};

pub fn ownership(kind: EntityKind) -> &'static dyn OwnershipAccess {
    match kind {
        EntityKind::Lead => &LEADS,
        EntityKind::Contact => &CONTACTS,
        EntityKind::Organization => &ORGANIZATIONS,
        EntityKind::Partner => &PARTNERS,
        EntityKind::Deal => &DEALS,
    }
}

pub(crate) async fn existing_owner(
    txn: &DatabaseTransaction,
    kind: EntityKind,
    entity_id: Uuid,
) -> ApiResult<Uuid> {
    ownership(kind)
        .find_owner(txn, entity_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY_NOT_FOUND))
}

pub(crate) async fn active_user(txn: &DatabaseTransaction, user_id: Uuid) -> ApiResult<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(txn)
        .await?
        .filter(|model| model.is_active)
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

/// Moves an entity to a new owner and drops every share it had.
///
/// Transferring to the current owner still clears the shares.
#[instrument(name = "crm.ownership.transfer", skip(db, actor, now))]
pub async fn transfer_entity(
    db: &DatabaseConnection,
    actor: &Actor,
    kind: EntityKind,
    entity_id: Uuid,
    new_owner_id: Uuid,
    now: DateTime<Utc>,
) -> ApiResult<OperationOutcome> {
    actor.require_admin()?;
    let txn = db.begin().await?;
    let previous_owner = existing_owner(&txn, kind, entity_id).await?;
    active_user(&txn, new_owner_id).await?;

    ownership(kind)
        .set_owner(&txn, entity_id, new_owner_id, now.into())
        .await?;
    let cleared = shared_entity::Entity::delete_many()
        .filter(shared_entity::Column::EntityType.eq(kind))
        .filter(shared_entity::Column::EntityId.eq(entity_id))
        .exec(&txn)
        .await?
        .rows_affected;
    txn.commit().await?;

    info!(%previous_owner, cleared_shares = cleared, "entity transferred");
    Ok(OperationOutcome::ok(TRANSFERRED))
}
