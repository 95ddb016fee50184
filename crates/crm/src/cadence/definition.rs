//! CRUD over cadence templates.

use chrono::{DateTime, Utc};
use entity::{cadence, cadence_step, lead_cadence};
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait,
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{lifecycle::MAX_STEP_DAY, CADENCE_NOT_FOUND};
use crate::auth::{Actor, UserRole};

const MAX_NAME_LEN: usize = 200;
const MAX_SUBJECT_LEN: usize = 300;

pub const SLUG_TAKEN: &str = "Já existe uma cadência com este slug";
pub const STEPS_LOCKED: &str = "Cadência já aplicada a leads; etapas não podem ser alteradas";
pub const CADENCE_IN_USE: &str = "Cadência em uso por leads não pode ser excluída";

#[derive(Debug, Clone)]
pub struct NewCadenceStep {
    pub day_number: i32,
    pub channel: cadence_step::Channel,
    pub subject: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewCadence {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub duration_days: i32,
    pub icp_id: Option<Uuid>,
    pub status: Option<cadence::Status>,
    pub steps: Vec<NewCadenceStep>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CadenceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub duration_days: Option<i32>,
    pub icp_id: Option<Uuid>,
    pub status: Option<cadence::Status>,
}

#[derive(Debug, Clone, Default)]
pub struct CadenceFilter {
    pub status: Option<cadence::Status>,
    pub icp_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CadenceWithSteps {
    pub cadence: cadence::Model,
    pub steps: Vec<cadence_step::Model>,
}

/// Lowercase ASCII slug; accented Latin letters fold to their base letter.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        };
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn validate_name(name: &str) -> ApiResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid("Nome da cadência é obrigatório"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::invalid(format!(
            "Nome da cadência deve ter no máximo {MAX_NAME_LEN} caracteres"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_duration(duration_days: i32) -> ApiResult<()> {
    if duration_days < 0 {
        return Err(ApiError::invalid("Duração deve ser maior ou igual a zero"));
    }
    Ok(())
}

fn validate_steps(steps: &[NewCadenceStep]) -> ApiResult<()> {
    for step in steps {
        if step.day_number < 0 {
            return Err(ApiError::invalid(
                "Dia da etapa deve ser maior ou igual a zero",
            ));
        }
        if step.day_number > MAX_STEP_DAY {
            return Err(ApiError::invalid(format!(
                "Dia da etapa deve ser no máximo {MAX_STEP_DAY}"
            )));
        }
        let subject = step.subject.trim();
        if subject.is_empty() {
            return Err(ApiError::invalid("Assunto da etapa é obrigatório"));
        }
        if subject.chars().count() > MAX_SUBJECT_LEN {
            return Err(ApiError::invalid(format!(
                "Assunto da etapa deve ter no máximo {MAX_SUBJECT_LEN} caracteres"
            )));
        }
    }
    Ok(())
}

async fn insert_steps(
    txn: &DatabaseTransaction,
    cadence_id: Uuid,
    steps: &[NewCadenceStep],
    now: DateTime<Utc>,
) -> ApiResult<Vec<cadence_step::Model>> {
    let mut created = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let model = cadence_step::ActiveModel {
            id: Set(Uuid::new_v4()),
            cadence_id: Set(cadence_id),
            day_number: Set(step.day_number),
            channel: Set(step.channel),
            subject: Set(step.subject.trim().to_string()),
            description: Set(step.description.clone()),
            sort_order: Set(step.sort_order.unwrap_or(index as i32)),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await?;
        created.push(model);
    }
    sort_steps(&mut created);
    Ok(created)
}

pub(crate) fn sort_steps(steps: &mut [cadence_step::Model]) {
    steps.sort_by_key(|step| (step.day_number, step.sort_order));
}

pub(crate) async fn ordered_steps<C: ConnectionTrait>(
    conn: &C,
    cadence_id: Uuid,
) -> ApiResult<Vec<cadence_step::Model>> {
    Ok(cadence_step::Entity::find()
        .filter(cadence_step::Column::CadenceId.eq(cadence_id))
        .order_by_asc(cadence_step::Column::DayNumber)
        .order_by_asc(cadence_step::Column::SortOrder)
        .all(conn)
        .await?)
}

async fn cadence_for_write(
    txn: &DatabaseTransaction,
    actor: &Actor,
    cadence_id: Uuid,
) -> ApiResult<cadence::Model> {
    let model = cadence::Entity::find_by_id(cadence_id)
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::not_found(CADENCE_NOT_FOUND))?;
    if !actor.can_write(model.owner_id) {
        return Err(ApiError::Forbidden);
    }
    Ok(model)
}

async fn usage_count(txn: &DatabaseTransaction, cadence_id: Uuid) -> ApiResult<u64> {
    Ok(lead_cadence::Entity::find()
        .filter(lead_cadence::Column::CadenceId.eq(cadence_id))
        .count(txn)
        .await?)
}

#[instrument(name = "crm.cadence.create", skip_all, fields(actor = %actor.user_id))]
pub async fn create_cadence(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewCadence,
    now: DateTime<Utc>,
) -> ApiResult<CadenceWithSteps> {
    actor.require(UserRole::Sales)?;
    let name = validate_name(&input.name)?;
    validate_duration(input.duration_days)?;
    validate_steps(&input.steps)?;
    let slug = slugify(input.slug.as_deref().unwrap_or(&name));
    if slug.is_empty() {
        return Err(ApiError::invalid("Slug inválido"));
    }

    let txn = db.begin().await?;
    let taken = cadence::Entity::find()
        .filter(cadence::Column::Slug.eq(slug.as_str()))
        .count(&txn)
        .await?;
    if taken > 0 {
        return Err(ApiError::conflict(SLUG_TAKEN));
    }

    let cadence = cadence::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        description: Set(input.description),
        objective: Set(input.objective),
        duration_days: Set(input.duration_days),
        icp_id: Set(input.icp_id),
        status: Set(input.status.unwrap_or(cadence::Status::Active)),
        owner_id: Set(actor.user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    let steps = insert_steps(&txn, cadence.id, &input.steps, now).await?;
    txn.commit().await?;
    info!(cadence_id = %cadence.id, slug = %cadence.slug, steps = steps.len(), "cadence created");
    Ok(CadenceWithSteps { cadence, steps })
}

#[instrument(name = "crm.cadence.update", skip_all, fields(cadence_id = %cadence_id))]
pub async fn update_cadence(
    db: &DatabaseConnection,
    actor: &Actor,
    cadence_id: Uuid,
    changes: CadenceChanges,
    now: DateTime<Utc>,
) -> ApiResult<cadence::Model> {
    actor.require(UserRole::Sales)?;
    let name = changes.name.as_deref().map(validate_name).transpose()?;
    if let Some(days) = changes.duration_days {
        validate_duration(days)?;
    }

    let txn = db.begin().await?;
    let existing = cadence_for_write(&txn, actor, cadence_id).await?;
    let mut active: cadence::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = changes.description {
        active.description = Set(Some(description));
    }
    if let Some(objective) = changes.objective {
        active.objective = Set(Some(objective));
    }
    if let Some(days) = changes.duration_days {
        active.duration_days = Set(days);
    }
    if let Some(icp_id) = changes.icp_id {
        active.icp_id = Set(Some(icp_id));
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    active.updated_at = Set(now.into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    info!("cadence updated");
    Ok(updated)
}

/// Steps can only be replaced while no lead runs the cadence.
#[instrument(name = "crm.cadence.replace_steps", skip_all, fields(cadence_id = %cadence_id))]
pub async fn replace_cadence_steps(
    db: &DatabaseConnection,
    actor: &Actor,
    cadence_id: Uuid,
    steps: Vec<NewCadenceStep>,
    now: DateTime<Utc>,
) -> ApiResult<CadenceWithSteps> {
    actor.require(UserRole::Sales)?;
    validate_steps(&steps)?;

    let txn = db.begin().await?;
    let existing = cadence_for_write(&txn, actor, cadence_id).await?;
    if usage_count(&txn, cadence_id).await? > 0 {
        return Err(ApiError::conflict(STEPS_LOCKED));
    }

    cadence_step::Entity::delete_many()
        .filter(cadence_step::Column::CadenceId.eq(cadence_id))
        .exec(&txn)
        .await?;
    let created = insert_steps(&txn, cadence_id, &steps, now).await?;
    let stamp: DateTimeWithTimeZone = now.into();
    cadence::Entity::update_many()
        .col_expr(cadence::Column::UpdatedAt, Expr::value(stamp))
        .filter(cadence::Column::Id.eq(cadence_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    info!(steps = created.len(), "cadence steps replaced");
    Ok(CadenceWithSteps {
        cadence: cadence::Model {
            updated_at: stamp,
            ..existing
        },
        steps: created,
    })
}

/// Deletes an unreferenced cadence and its steps.
#[instrument(name = "crm.cadence.delete", skip_all, fields(cadence_id = %cadence_id))]
pub async fn delete_cadence(
    db: &DatabaseConnection,
    actor: &Actor,
    cadence_id: Uuid,
) -> ApiResult<()> {
    actor.require(UserRole::Sales)?;
    let txn = db.begin().await?;
    cadence_for_write(&txn, actor, cadence_id).await?;
    let references = usage_count(&txn, cadence_id).await?;
    if references > 0 {
        tracing::warn!(references, "cadence still referenced by lead cadences");
        return Err(ApiError::conflict(CADENCE_IN_USE));
    }
    cadence_step::Entity::delete_many()
        .filter(cadence_step::Column::CadenceId.eq(cadence_id))
        .exec(&txn)
        .await?;
    cadence::Entity::delete_by_id(cadence_id).exec(&txn).await?;
    txn.commit().await?;
    info!("cadence deleted");
    Ok(())
}

pub async fn list_cadences(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: CadenceFilter,
) -> ApiResult<Vec<CadenceWithSteps>> {
    actor.require(UserRole::Viewer)?;
    let mut query = cadence::Entity::find().order_by_asc(cadence::Column::Name);
    if let Some(status) = filter.status {
        query = query.filter(cadence::Column::Status.eq(status));
    }
    if let Some(icp_id) = filter.icp_id {
        query = query.filter(cadence::Column::IcpId.eq(icp_id));
    }
    let cadences = query.all(db).await?;
    if cadences.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = cadences.iter().map(|c| c.id).collect();
    let mut steps = cadence_step::Entity::find()
        .filter(cadence_step::Column::CadenceId.is_in(ids))
        .all(db)
        .await?;
    sort_steps(&mut steps);

    Ok(cadences
        .into_iter()
        .map(|cadence| {
            let own = steps
                .iter()
                .filter(|step| step.cadence_id == cadence.id)
                .cloned()
                .collect();
            CadenceWithSteps {
                cadence,
                steps: own,
            }
        })
        .collect())
}

pub async fn get_cadence(
    db: &DatabaseConnection,
    actor: &Actor,
    cadence_id: Uuid,
) -> ApiResult<CadenceWithSteps> {
    actor.require(UserRole::Viewer)?;
    let cadence = cadence::Entity::find_by_id(cadence_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(CADENCE_NOT_FOUND))?;
    let steps = ordered_steps(db, cadence_id).await?;
    Ok(CadenceWithSteps { cadence, steps })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(day_number: i32, subject: &str) -> NewCadenceStep {
        NewCadenceStep {
            day_number,
            channel: cadence_step::Channel::Email,
            subject: subject.into(),
            description: None,
            sort_order: None,
        }
    }

    #[test]
    fn slugify_folds_accents_and_separators() {
        assert_eq!(slugify("Outbound-5"), "outbound-5");
        assert_eq!(slugify("  Prospecção Ativa — Saúde  "), "prospeccao-ativa-saude");
        assert_eq!(slugify("Já   visto!!"), "ja-visto");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(validate_name("  Inbound  ").expect("valid"), "Inbound");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(201)).is_err());
        assert!(validate_name(&"x".repeat(200)).is_ok());
    }

    #[test]
    fn steps_require_subject_and_non_negative_day() {
        assert!(validate_steps(&[step(0, "Intro")]).is_ok());
        let negative = validate_steps(&[step(-1, "Intro")]).expect_err("negative day");
        assert_eq!(negative.code(), "VALIDATION");
        assert!(validate_steps(&[step(1, "  ")]).is_err());
    }

    #[test]
    fn step_day_is_bounded() {
        assert!(validate_steps(&[step(MAX_STEP_DAY, "Última")]).is_ok());
        let far = validate_steps(&[step(MAX_STEP_DAY + 1, "Tarde")]).expect_err("too far");
        assert_eq!(far.code(), "VALIDATION");
        assert!(validate_steps(&[step(i32::MAX, "Nunca")]).is_err());
    }

    #[test]
    fn negative_duration_is_rejected() {
        assert!(validate_duration(0).is_ok());
        assert!(validate_duration(-3).is_err());
    }
}
