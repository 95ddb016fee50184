//! Visibility rules for leads and the cadences running on them.
//!
//! Records the caller may not see are reported exactly like missing rows.

use entity::{lead, lead_cadence, shared_entity};
use platform_api::{ApiError, ApiResult};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::auth::Actor;

pub const LEAD_NOT_FOUND: &str = "Lead não encontrado";
pub const LEAD_CADENCE_NOT_FOUND: &str = "Cadência do lead não encontrada";

pub async fn is_shared_with<C: ConnectionTrait>(
    conn: &C,
    kind: shared_entity::EntityKind,
    entity_id: Uuid,
    user_id: Uuid,
) -> ApiResult<bool> {
    let count = shared_entity::Entity::find()
        .filter(shared_entity::Column::EntityType.eq(kind))
        .filter(shared_entity::Column::EntityId.eq(entity_id))
        .filter(shared_entity::Column::SharedWithUserId.eq(user_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

async fn can_read_lead<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    model: &lead::Model,
) -> ApiResult<bool> {
    if actor.can_write(model.owner_id) {
        return Ok(true);
    }
    is_shared_with(conn, shared_entity::EntityKind::Lead, model.id, actor.user_id).await
}

pub async fn lead_for_write<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    lead_id: Uuid,
) -> ApiResult<lead::Model> {
    lead::Entity::find_by_id(lead_id)
        .one(conn)
        .await?
        .filter(|model| actor.can_write(model.owner_id))
        .ok_or_else(|| ApiError::not_found(LEAD_NOT_FOUND))
}

pub async fn lead_for_read<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    lead_id: Uuid,
) -> ApiResult<lead::Model> {
    let model = lead::Entity::find_by_id(lead_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::not_found(LEAD_NOT_FOUND))?;
    if can_read_lead(conn, actor, &model).await? {
        Ok(model)
    } else {
        Err(ApiError::not_found(LEAD_NOT_FOUND))
    }
}

/// Lead cadences inherit the write access of their lead.
pub async fn lead_cadence_for_write<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    lead_cadence_id: Uuid,
) -> ApiResult<lead_cadence::Model> {
    let instance = lead_cadence::Entity::find_by_id(lead_cadence_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::not_found(LEAD_CADENCE_NOT_FOUND))?;
    match lead_for_write(conn, actor, instance.lead_id).await {
        Ok(_) => Ok(instance),
        Err(ApiError::NotFound(_)) => Err(ApiError::not_found(LEAD_CADENCE_NOT_FOUND)),
        Err(other) => Err(other),
    }
}

pub async fn lead_cadence_for_read<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    lead_cadence_id: Uuid,
) -> ApiResult<lead_cadence::Model> {
    let instance = lead_cadence::Entity::find_by_id(lead_cadence_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::not_found(LEAD_CADENCE_NOT_FOUND))?;
    match lead_for_read(conn, actor, instance.lead_id).await {
        Ok(_) => Ok(instance),
        Err(ApiError::NotFound(_)) => Err(ApiError::not_found(LEAD_CADENCE_NOT_FOUND)),
        Err(other) => Err(other),
    }
}
