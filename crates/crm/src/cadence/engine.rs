//! Applies cadence templates to leads and drives each running instance
//! through its lifecycle.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use entity::{activity, cadence, cadence_step, lead_cadence, lead_cadence_activity};
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    definition::ordered_steps,
    lifecycle::{self, Transition},
    CADENCE_NOT_FOUND,
};
use crate::{
    access,
    auth::{Actor, UserRole},
};

pub const CADENCE_INACTIVE: &str = "Cadência inativa não pode ser aplicada";
pub const ALREADY_RUNNING: &str = "Lead já possui esta cadência em andamento";
pub const DATE_OUT_OF_RANGE: &str = "Data agendada fora do intervalo suportado";

#[derive(Debug, Clone)]
pub struct ApplyCadence {
    pub lead_id: Uuid,
    pub cadence_id: Uuid,
    pub start_date: NaiveDate,
    pub notes: Option<String>,
}

/// A lead cadence with its read-time progress.
#[derive(Debug, Clone)]
pub struct LeadCadenceSummary {
    pub instance: lead_cadence::Model,
    pub cadence: Option<cadence::Model>,
    pub total_steps: i32,
    pub completed_steps: i32,
    pub progress: i32,
}

#[derive(Debug, Clone)]
pub struct ScheduledStep {
    pub link: lead_cadence_activity::Model,
    pub step: cadence_step::Model,
    pub activity: activity::Model,
}

#[instrument(
    name = "crm.cadence.apply",
    skip_all,
    fields(lead_id = %input.lead_id, cadence_id = %input.cadence_id)
)]
pub async fn apply_cadence_to_lead(
    db: &DatabaseConnection,
    actor: &Actor,
    input: ApplyCadence,
    now: DateTime<Utc>,
) -> ApiResult<lead_cadence::Model> {
    actor.require(UserRole::Sales)?;
    let txn = db.begin().await?;
    let lead = access::lead_for_write(&txn, actor, input.lead_id).await?;
    let template = cadence::Entity::find_by_id(input.cadence_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found(CADENCE_NOT_FOUND))?;
    if !matches!(template.status, cadence::Status::Active) {
        return Err(ApiError::conflict(CADENCE_INACTIVE));
    }

    let running = lead_cadence::Entity::find()
        .filter(lead_cadence::Column::LeadId.eq(lead.id))
        .filter(lead_cadence::Column::CadenceId.eq(template.id))
        .filter(
            lead_cadence::Column::Status
                .is_in([lead_cadence::Status::Active, lead_cadence::Status::Paused]),
        )
        .count(&txn)
        .await?;
    if running > 0 {
        return Err(ApiError::conflict(ALREADY_RUNNING));
    }

    let steps = ordered_steps(&txn, template.id).await?;
    let schedule = steps
        .iter()
        .map(|step| {
            lifecycle::scheduled_date(input.start_date, step.day_number)
                .map(|due_date| (step, due_date))
                .ok_or_else(|| ApiError::invalid(DATE_OUT_OF_RANGE))
        })
        .collect::<ApiResult<Vec<_>>>()?;
    let stamp: DateTimeWithTimeZone = now.into();
    let instance = lead_cadence::ActiveModel {
        id: Set(Uuid::new_v4()),
        lead_id: Set(lead.id),
        cadence_id: Set(template.id),
        status: Set(lead_cadence::Status::Active),
        start_date: Set(input.start_date),
        paused_at: Set(None),
        completed_at: Set(None),
        cancelled_at: Set(None),
        current_step: Set(0),
        notes: Set(input.notes),
        owner_id: Set(actor.user_id),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
    .insert(&txn)
    .await?;

    for (step, due_date) in schedule {
        let touch = activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(lifecycle::activity_kind(step.channel)),
            subject: Set(step.subject.clone()),
            description: Set(step.description.clone()),
            due_date: Set(due_date),
            completed: Set(false),
            completed_at: Set(None),
            lead_id: Set(Some(lead.id)),
            organization_id: Set(None),
            deal_id: Set(None),
            owner_id: Set(actor.user_id),
            created_at: Set(stamp),
            updated_at: Set(stamp),
        }
        .insert(&txn)
        .await?;
        lead_cadence_activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            lead_cadence_id: Set(instance.id),
            cadence_step_id: Set(step.id),
            activity_id: Set(touch.id),
            scheduled_date: Set(due_date),
            created_at: Set(stamp),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!(lead_cadence_id = %instance.id, steps = steps.len(), "cadence applied to lead");
    Ok(instance)
}

pub async fn pause_lead_cadence(
    db: &DatabaseConnection,
    actor: &Actor,
    lead_cadence_id: Uuid,
    now: DateTime<Utc>,
) -> ApiResult<lead_cadence::Model> {
    run_transition(db, actor, lead_cadence_id, Transition::Pause, now).await
}

/// Not-yet-due open touches move forward by the paused span.
pub async fn resume_lead_cadence(
    db: &DatabaseConnection,
    actor: &Actor,
    lead_cadence_id: Uuid,
    now: DateTime<Utc>,
) -> ApiResult<lead_cadence::Model> {
    run_transition(db, actor, lead_cadence_id, Transition::Resume, now).await
}

pub async fn cancel_lead_cadence(
    db: &DatabaseConnection,
    actor: &Actor,
    lead_cadence_id: Uuid,
    now: DateTime<Utc>,
) -> ApiResult<lead_cadence::Model> {
    run_transition(db, actor, lead_cadence_id, Transition::Cancel, now).await
}

/// Manual completion; open steps do not block it.
pub async fn complete_lead_cadence(
    db: &DatabaseConnection,
    actor: &Actor,
    lead_cadence_id: Uuid,
    now: DateTime<Utc>,
) -> ApiResult<lead_cadence::Model> {
    run_transition(db, actor, lead_cadence_id, Transition::Complete, now).await
}

#[instrument(name = "crm.cadence.transition", skip(db, actor, now))]
async fn run_transition(
    db: &DatabaseConnection,
    actor: &Actor,
    lead_cadence_id: Uuid,
    action: Transition,
    now: DateTime<Utc>,
) -> ApiResult<lead_cadence::Model> {
    actor.require(UserRole::Sales)?;
    let txn = db.begin().await?;
    let instance = access::lead_cadence_for_write(&txn, actor, lead_cadence_id).await?;
    let next = lifecycle::transition(instance.status, action)?;
    let paused_at = instance.paused_at;

    let stamp: DateTimeWithTimeZone = now.into();
    let mut active: lead_cadence::ActiveModel = instance.into();
    active.status = Set(next);
    active.updated_at = Set(stamp);
    match action {
        Transition::Pause => active.paused_at = Set(Some(stamp)),
        Transition::Resume => {
            if let Some(paused_at) = paused_at {
                let shifted =
                    shift_pending_activities(&txn, lead_cadence_id, paused_at, now).await?;
                info!(shifted, "pending activities rescheduled");
            }
            active.paused_at = Set(None);
        }
        Transition::Cancel => active.cancelled_at = Set(Some(stamp)),
        Transition::Complete => active.completed_at = Set(Some(stamp)),
    }
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    info!(status = ?updated.status, "lead cadence transitioned");
    Ok(updated)
}

async fn shift_pending_activities(
    txn: &DatabaseTransaction,
    lead_cadence_id: Uuid,
    paused_at: DateTimeWithTimeZone,
    now: DateTime<Utc>,
) -> ApiResult<usize> {
    let paused_at = paused_at.with_timezone(&Utc);
    let days = lifecycle::pause_duration_days(paused_at, now);
    if days == 0 {
        return Ok(0);
    }
    let paused_on = paused_at.date_naive();

    let activity_ids: Vec<Uuid> = lead_cadence_activity::Entity::find()
        .filter(lead_cadence_activity::Column::LeadCadenceId.eq(lead_cadence_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|link| link.activity_id)
        .collect();
    if activity_ids.is_empty() {
        return Ok(0);
    }
    let touches = activity::Entity::find()
        .filter(activity::Column::Id.is_in(activity_ids))
        .all(txn)
        .await?;

    let mut shifted = 0;
    for touch in touches {
        if !lifecycle::should_shift(touch.completed, touch.due_date, paused_on) {
            continue;
        }
        let due_date = lifecycle::shift_date(touch.due_date, days)
            .ok_or_else(|| ApiError::invalid(DATE_OUT_OF_RANGE))?;
        let mut active: activity::ActiveModel = touch.into();
        active.due_date = Set(due_date);
        active.updated_at = Set(now.into());
        active.update(txn).await?;
        shifted += 1;
    }
    Ok(shifted)
}

pub async fn get_lead_cadences(
    db: &DatabaseConnection,
    actor: &Actor,
    lead_id: Uuid,
) -> ApiResult<Vec<LeadCadenceSummary>> {
    actor.require(UserRole::Viewer)?;
    access::lead_for_read(db, actor, lead_id).await?;
    let instances = lead_cadence::Entity::find()
        .filter(lead_cadence::Column::LeadId.eq(lead_id))
        .order_by_desc(lead_cadence::Column::CreatedAt)
        .all(db)
        .await?;
    summarize(db, instances).await
}

/// Derives step counts and progress; nothing here is persisted.
pub async fn summarize<C: ConnectionTrait>(
    conn: &C,
    instances: Vec<lead_cadence::Model>,
) -> ApiResult<Vec<LeadCadenceSummary>> {
    if instances.is_empty() {
        return Ok(Vec::new());
    }
    let instance_ids: Vec<Uuid> = instances.iter().map(|i| i.id).collect();
    let cadence_ids: Vec<Uuid> = instances.iter().map(|i| i.cadence_id).collect();

    let links = lead_cadence_activity::Entity::find()
        .filter(lead_cadence_activity::Column::LeadCadenceId.is_in(instance_ids))
        .all(conn)
        .await?;
    let completed: HashMap<Uuid, bool> = if links.is_empty() {
        HashMap::new()
    } else {
        activity::Entity::find()
            .filter(activity::Column::Id.is_in(links.iter().map(|l| l.activity_id)))
            .all(conn)
            .await?
            .into_iter()
            .map(|a| (a.id, a.completed))
            .collect()
    };
    let cadences: HashMap<Uuid, cadence::Model> = cadence::Entity::find()
        .filter(cadence::Column::Id.is_in(cadence_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    Ok(instances
        .into_iter()
        .map(|instance| {
            let own = links.iter().filter(|l| l.lead_cadence_id == instance.id);
            let total_steps = own.clone().count() as i32;
            let completed_steps = own
                .filter(|l| completed.get(&l.activity_id).copied().unwrap_or(false))
                .count() as i32;
            let cadence = cadences.get(&instance.cadence_id).cloned();
            LeadCadenceSummary {
                cadence,
                total_steps,
                completed_steps,
                progress: lifecycle::progress(completed_steps, total_steps),
                instance,
            }
        })
        .collect())
}

pub async fn summarize_one<C: ConnectionTrait>(
    conn: &C,
    instance: lead_cadence::Model,
) -> ApiResult<LeadCadenceSummary> {
    summarize(conn, vec![instance])
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found(access::LEAD_CADENCE_NOT_FOUND))
}

pub async fn get_lead_cadence_activities(
    db: &DatabaseConnection,
    actor: &Actor,
    lead_cadence_id: Uuid,
) -> ApiResult<Vec<ScheduledStep>> {
    actor.require(UserRole::Viewer)?;
    access::lead_cadence_for_read(db, actor, lead_cadence_id).await?;
    scheduled_steps(db, lead_cadence_id).await
}

/// Scheduled steps of one instance in (day_number, sort_order) order.
pub(crate) async fn scheduled_steps<C: ConnectionTrait>(
    conn: &C,
    lead_cadence_id: Uuid,
) -> ApiResult<Vec<ScheduledStep>> {
    let links = lead_cadence_activity::Entity::find()
        .filter(lead_cadence_activity::Column::LeadCadenceId.eq(lead_cadence_id))
        .all(conn)
        .await?;
    if links.is_empty() {
        return Ok(Vec::new());
    }
    let mut steps: HashMap<Uuid, cadence_step::Model> = cadence_step::Entity::find()
        .filter(cadence_step::Column::Id.is_in(links.iter().map(|l| l.cadence_step_id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let mut touches: HashMap<Uuid, activity::Model> = activity::Entity::find()
        .filter(activity::Column::Id.is_in(links.iter().map(|l| l.activity_id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let mut scheduled: Vec<ScheduledStep> = links
        .into_iter()
        .filter_map(|link| {
            let step = steps.remove(&link.cadence_step_id)?;
            let activity = touches.remove(&link.activity_id)?;
            Some(ScheduledStep {
                link,
                step,
                activity,
            })
        })
        .collect();
    scheduled.sort_by_key(|s| (s.step.day_number, s.step.sort_order));
    Ok(scheduled)
}
