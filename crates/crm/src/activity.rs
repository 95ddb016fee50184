use chrono::{DateTime, Utc};
use entity::{activity, lead_cadence, lead_cadence_activity};
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait,
    DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    auth::{Actor, UserRole},
    cadence::engine::scheduled_steps,
};

pub const ACTIVITY_NOT_FOUND: &str = "Atividade não encontrada";

/// Marks an activity done or open again.
///
/// Activities scheduled by a cadence also move that cadence's `current_step`
/// cursor to the first open step. The cadence itself is never completed here.
#[instrument(name = "crm.activity.set_completed", skip(db, actor, now))]
pub async fn set_activity_completed(
    db: &DatabaseConnection,
    actor: &Actor,
    activity_id: Uuid,
    completed: bool,
    now: DateTime<Utc>,
) -> ApiResult<activity::Model> {
    actor.require(UserRole::Sales)?;
    let txn = db.begin().await?;
    let existing = activity::Entity::find_by_id(activity_id)
        .one(&txn)
        .await?
        .filter(|model| actor.can_write(model.owner_id))
        .ok_or_else(|| ApiError::not_found(ACTIVITY_NOT_FOUND))?;

    let stamp: DateTimeWithTimeZone = now.into();
    let mut active: activity::ActiveModel = existing.into();
    active.completed = Set(completed);
    active.completed_at = Set(completed.then_some(stamp));
    active.updated_at = Set(stamp);
    let updated = active.update(&txn).await?;

    let link = lead_cadence_activity::Entity::find()
        .filter(lead_cadence_activity::Column::ActivityId.eq(activity_id))
        .one(&txn)
        .await?;
    if let Some(link) = link {
        advance_cursor(&txn, link.lead_cadence_id, stamp).await?;
    }

    txn.commit().await?;
    Ok(updated)
}

async fn advance_cursor(
    txn: &DatabaseTransaction,
    lead_cadence_id: Uuid,
    stamp: DateTimeWithTimeZone,
) -> ApiResult<()> {
    let steps = scheduled_steps(txn, lead_cadence_id).await?;
    let cursor = steps
        .iter()
        .position(|s| !s.activity.completed)
        .unwrap_or(steps.len()) as i32;
    lead_cadence::Entity::update_many()
        .col_expr(lead_cadence::Column::CurrentStep, Expr::value(cursor))
        .col_expr(lead_cadence::Column::UpdatedAt, Expr::value(stamp))
        .filter(lead_cadence::Column::Id.eq(lead_cadence_id))
        .exec(txn)
        .await?;
    debug!(%lead_cadence_id, cursor, "cadence cursor moved");
    Ok(())
}
