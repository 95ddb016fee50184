use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use entity::{shared_entity, user};
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{Actor, UserRole},
    ownership::{active_user, existing_owner, EntityKind, OperationOutcome},
};

pub const ALREADY_SHARED: &str = "Entidade já compartilhada com este usuário";
pub const SHARE_WITH_OWNER: &str = "Não é possível compartilhar com o proprietário";
pub const SHARE_NOT_FOUND: &str = "Compartilhamento não encontrado";
pub const SHARED: &str = "Entidade compartilhada com sucesso";
pub const UNSHARED: &str = "Compartilhamento removido";

#[derive(Debug, Clone)]
pub struct SharedUser {
    pub share_id: Uuid,
    pub user: user::Model,
    pub shared_by: Option<user::Model>,
    pub shared_at: DateTime<Utc>,
}

fn shares_of(kind: EntityKind, entity_id: Uuid) -> sea_orm::Select<shared_entity::Entity> {
    shared_entity::Entity::find()
        .filter(shared_entity::Column::EntityType.eq(kind))
        .filter(shared_entity::Column::EntityId.eq(entity_id))
}

#[instrument(name = "crm.sharing.share", skip(db, actor, now))]
pub async fn share_entity(
    db: &DatabaseConnection,
    actor: &Actor,
    kind: EntityKind,
    entity_id: Uuid,
    target_user_id: Uuid,
    now: DateTime<Utc>,
) -> ApiResult<OperationOutcome> {
    actor.require_admin()?;
    let txn = db.begin().await?;
    let owner_id = existing_owner(&txn, kind, entity_id).await?;
    if owner_id == target_user_id {
        return Err(ApiError::conflict(SHARE_WITH_OWNER));
    }
    active_user(&txn, target_user_id).await?;
    let existing = shares_of(kind, entity_id)
        .filter(shared_entity::Column::SharedWithUserId.eq(target_user_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(ALREADY_SHARED));
    }

    shared_entity::ActiveModel {
        id: Set(Uuid::new_v4()),
        entity_type: Set(kind),
        entity_id: Set(entity_id),
        shared_with_user_id: Set(target_user_id),
        shared_by_user_id: Set(actor.user_id),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!("entity shared");
    Ok(OperationOutcome::ok(SHARED))
}

#[instrument(name = "crm.sharing.unshare", skip(db, actor))]
pub async fn unshare_entity(
    db: &DatabaseConnection,
    actor: &Actor,
    kind: EntityKind,
    entity_id: Uuid,
    target_user_id: Uuid,
) -> ApiResult<OperationOutcome> {
    actor.require_admin()?;
    let txn = db.begin().await?;
    let share = shares_of(kind, entity_id)
        .filter(shared_entity::Column::SharedWithUserId.eq(target_user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found(SHARE_NOT_FOUND))?;
    shared_entity::Entity::delete_by_id(share.id)
        .exec(&txn)
        .await?;
    txn.commit().await?;
    info!("entity unshared");
    Ok(OperationOutcome::ok(UNSHARED))
}

/// Everyone holding a share on the entity, oldest grant first.
pub async fn get_shared_users(
    db: &DatabaseConnection,
    actor: &Actor,
    kind: EntityKind,
    entity_id: Uuid,
) -> ApiResult<Vec<SharedUser>> {
    actor.require(UserRole::Viewer)?;
    let shares = shares_of(kind, entity_id)
        .order_by_asc(shared_entity::Column::CreatedAt)
        .all(db)
        .await?;
    if shares.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids: HashSet<Uuid> = shares
        .iter()
        .flat_map(|s| [s.shared_with_user_id, s.shared_by_user_id])
        .collect();
    let users: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(shares
        .into_iter()
        .filter_map(|share| {
            let user = users.get(&share.shared_with_user_id)?.clone();
            Some(SharedUser {
                share_id: share.id,
                user,
                shared_by: users.get(&share.shared_by_user_id).cloned(),
                shared_at: share.created_at.with_timezone(&Utc),
            })
        })
        .collect())
}

/// Active users who are neither the owner nor already shared with.
pub async fn get_available_users_for_sharing(
    db: &DatabaseConnection,
    actor: &Actor,
    kind: EntityKind,
    entity_id: Uuid,
) -> ApiResult<Vec<user::Model>> {
    actor.require(UserRole::Viewer)?;
    let txn = db.begin().await?;
    let owner_id = existing_owner(&txn, kind, entity_id).await?;
    let mut excluded: HashSet<Uuid> = shares_of(kind, entity_id)
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| s.shared_with_user_id)
        .collect();
    excluded.insert(owner_id);

    let candidates = user::Entity::find()
        .filter(user::Column::IsActive.eq(true))
        .filter(user::Column::Id.is_not_in(excluded))
        .order_by_asc(user::Column::Name)
        .all(&txn)
        .await?;
    txn.commit().await?;
    Ok(candidates)
}
