use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, Enum, ErrorExtensions, InputObject, Object, Schema, SimpleObject,
    ID,
};
use chrono::{DateTime, NaiveDate, Utc};
use entity::{cadence, cadence_step, contact, lead_cadence, organization, shared_entity, user};
use platform_api::{ApiError, ApiResult};
use sea_orm::{prelude::DateTimeWithTimeZone, DatabaseConnection};
use uuid::Uuid;

use crate::{
    activity::set_activity_completed,
    auth::Actor,
    cadence::{
        definition::{self, CadenceChanges, CadenceFilter, CadenceWithSteps, NewCadence, NewCadenceStep},
        engine::{self, ApplyCadence, LeadCadenceSummary, ScheduledStep},
    },
    conversion::{self, Conversion},
    ownership::{self, OperationOutcome},
    sharing::{self, SharedUser},
    users,
};

pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(db: Arc<DatabaseConnection>) -> CrmSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .finish()
}

#[derive(Default)]
pub struct QueryRoot;

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl QueryRoot {
    async fn crm(&self) -> CrmQuery {
        CrmQuery
    }
}

#[Object]
impl MutationRoot {
    async fn crm(&self) -> CrmMutation {
        CrmMutation
    }
}

#[derive(Default)]
pub struct CrmQuery;

#[derive(Default)]
pub struct CrmMutation;

#[Object]
impl CrmQuery {
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<UserNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let model = gql(users::current_user(db.as_ref(), &actor).await)?;
        Ok(model.into())
    }

    async fn users(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<UserNode>> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let models = gql(users::list_users(db.as_ref(), &actor).await)?;
        Ok(models.into_iter().map(UserNode::from).collect())
    }

    async fn cadences(
        &self,
        ctx: &Context<'_>,
        filter: Option<CadenceFilterInput>,
    ) -> async_graphql::Result<Vec<CadenceNode>> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let filter = match filter {
            Some(input) => CadenceFilter {
                status: input.status.map(Into::into),
                icp_id: input.icp_id.as_ref().map(parse_uuid).transpose()?,
            },
            None => CadenceFilter::default(),
        };
        let found = gql(definition::list_cadences(db.as_ref(), &actor, filter).await)?;
        Ok(found.into_iter().map(CadenceNode::from).collect())
    }

    async fn cadence(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<CadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let cadence_id = parse_uuid(&id)?;
        let found = gql(definition::get_cadence(db.as_ref(), &actor, cadence_id).await)?;
        Ok(found.into())
    }

    async fn lead_cadences(
        &self,
        ctx: &Context<'_>,
        lead_id: ID,
    ) -> async_graphql::Result<Vec<LeadCadenceNode>> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let lead_id = parse_uuid(&lead_id)?;
        let found = gql(engine::get_lead_cadences(db.as_ref(), &actor, lead_id).await)?;
        Ok(found.into_iter().map(LeadCadenceNode::from).collect())
    }

    async fn lead_cadence_activities(
        &self,
        ctx: &Context<'_>,
        lead_cadence_id: ID,
    ) -> async_graphql::Result<Vec<ScheduledActivityNode>> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let id = parse_uuid(&lead_cadence_id)?;
        let found = gql(engine::get_lead_cadence_activities(db.as_ref(), &actor, id).await)?;
        Ok(found.into_iter().map(ScheduledActivityNode::from).collect())
    }

    async fn shared_users(
        &self,
        ctx: &Context<'_>,
        entity_type: EntityType,
        entity_id: ID,
    ) -> async_graphql::Result<Vec<SharedUserNode>> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let entity_id = parse_uuid(&entity_id)?;
        let found = gql(
            sharing::get_shared_users(db.as_ref(), &actor, entity_type.into(), entity_id).await,
        )?;
        Ok(found.into_iter().map(SharedUserNode::from).collect())
    }

    async fn available_users_for_sharing(
        &self,
        ctx: &Context<'_>,
        entity_type: EntityType,
        entity_id: ID,
    ) -> async_graphql::Result<Vec<UserNode>> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let entity_id = parse_uuid(&entity_id)?;
        let found = gql(
            sharing::get_available_users_for_sharing(
                db.as_ref(),
                &actor,
                entity_type.into(),
                entity_id,
            )
            .await,
        )?;
        Ok(found.into_iter().map(UserNode::from).collect())
    }
}

#[Object]
impl CrmMutation {
    async fn create_cadence(
        &self,
        ctx: &Context<'_>,
        input: CreateCadenceInput,
    ) -> async_graphql::Result<CadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let new = NewCadence {
            name: input.name,
            slug: input.slug,
            description: input.description,
            objective: input.objective,
            duration_days: input.duration_days,
            icp_id: input.icp_id.as_ref().map(parse_uuid).transpose()?,
            status: input.status.map(Into::into),
            steps: input.steps.into_iter().map(NewCadenceStep::from).collect(),
        };
        let created = gql(definition::create_cadence(db.as_ref(), &actor, new, Utc::now()).await)?;
        Ok(created.into())
    }

    async fn update_cadence(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateCadenceInput,
    ) -> async_graphql::Result<CadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let cadence_id = parse_uuid(&id)?;
        let changes = CadenceChanges {
            name: input.name,
            description: input.description,
            objective: input.objective,
            duration_days: input.duration_days,
            icp_id: input.icp_id.as_ref().map(parse_uuid).transpose()?,
            status: input.status.map(Into::into),
        };
        gql(definition::update_cadence(db.as_ref(), &actor, cadence_id, changes, Utc::now()).await)?;
        let refreshed = gql(definition::get_cadence(db.as_ref(), &actor, cadence_id).await)?;
        Ok(refreshed.into())
    }

    async fn replace_cadence_steps(
        &self,
        ctx: &Context<'_>,
        id: ID,
        steps: Vec<CadenceStepInput>,
    ) -> async_graphql::Result<CadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let cadence_id = parse_uuid(&id)?;
        let steps = steps.into_iter().map(NewCadenceStep::from).collect();
        let replaced = gql(
            definition::replace_cadence_steps(db.as_ref(), &actor, cadence_id, steps, Utc::now())
                .await,
        )?;
        Ok(replaced.into())
    }

    async fn delete_cadence(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let cadence_id = parse_uuid(&id)?;
        gql(definition::delete_cadence(db.as_ref(), &actor, cadence_id).await)?;
        Ok(true)
    }

    async fn apply_cadence_to_lead(
        &self,
        ctx: &Context<'_>,
        input: ApplyCadenceInput,
    ) -> async_graphql::Result<LeadCadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let apply = ApplyCadence {
            lead_id: parse_uuid(&input.lead_id)?,
            cadence_id: parse_uuid(&input.cadence_id)?,
            start_date: input.start_date,
            notes: input.notes,
        };
        let instance = gql(engine::apply_cadence_to_lead(db.as_ref(), &actor, apply, Utc::now()).await)?;
        let summary = gql(engine::summarize_one(db.as_ref(), instance).await)?;
        Ok(summary.into())
    }

    async fn pause_lead_cadence(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<LeadCadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let id = parse_uuid(&id)?;
        let instance = gql(engine::pause_lead_cadence(db.as_ref(), &actor, id, Utc::now()).await)?;
        lead_cadence_node(db.as_ref(), instance).await
    }

    async fn resume_lead_cadence(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<LeadCadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let id = parse_uuid(&id)?;
        let instance = gql(engine::resume_lead_cadence(db.as_ref(), &actor, id, Utc::now()).await)?;
        lead_cadence_node(db.as_ref(), instance).await
    }

    async fn cancel_lead_cadence(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<LeadCadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let id = parse_uuid(&id)?;
        let instance = gql(engine::cancel_lead_cadence(db.as_ref(), &actor, id, Utc::now()).await)?;
        lead_cadence_node(db.as_ref(), instance).await
    }

    async fn complete_lead_cadence(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<LeadCadenceNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let id = parse_uuid(&id)?;
        let instance =
            gql(engine::complete_lead_cadence(db.as_ref(), &actor, id, Utc::now()).await)?;
        lead_cadence_node(db.as_ref(), instance).await
    }

    async fn set_activity_completed(
        &self,
        ctx: &Context<'_>,
        id: ID,
        completed: bool,
    ) -> async_graphql::Result<ActivityNode> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let id = parse_uuid(&id)?;
        let updated =
            gql(set_activity_completed(db.as_ref(), &actor, id, completed, Utc::now()).await)?;
        Ok(updated.into())
    }

    async fn transfer_entity(
        &self,
        ctx: &Context<'_>,
        entity_type: EntityType,
        entity_id: ID,
        new_owner_id: ID,
    ) -> async_graphql::Result<OperationResult> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let entity_id = parse_uuid(&entity_id)?;
        let new_owner_id = parse_uuid(&new_owner_id)?;
        let outcome = gql(
            ownership::transfer_entity(
                db.as_ref(),
                &actor,
                entity_type.into(),
                entity_id,
                new_owner_id,
                Utc::now(),
            )
            .await,
        )?;
        Ok(outcome.into())
    }

    async fn share_entity(
        &self,
        ctx: &Context<'_>,
        entity_type: EntityType,
        entity_id: ID,
        user_id: ID,
    ) -> async_graphql::Result<OperationResult> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let entity_id = parse_uuid(&entity_id)?;
        let user_id = parse_uuid(&user_id)?;
        let outcome = gql(
            sharing::share_entity(
                db.as_ref(),
                &actor,
                entity_type.into(),
                entity_id,
                user_id,
                Utc::now(),
            )
            .await,
        )?;
        Ok(outcome.into())
    }

    async fn unshare_entity(
        &self,
        ctx: &Context<'_>,
        entity_type: EntityType,
        entity_id: ID,
        user_id: ID,
    ) -> async_graphql::Result<OperationResult> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let entity_id = parse_uuid(&entity_id)?;
        let user_id = parse_uuid(&user_id)?;
        let outcome = gql(
            sharing::unshare_entity(db.as_ref(), &actor, entity_type.into(), entity_id, user_id)
                .await,
        )?;
        Ok(outcome.into())
    }

    async fn convert_lead_to_organization(
        &self,
        ctx: &Context<'_>,
        lead_id: ID,
    ) -> async_graphql::Result<ConversionPayload> {
        let actor = current_actor(ctx)?;
        let db = database(ctx)?;
        let lead_id = parse_uuid(&lead_id)?;
        let converted = gql(
            conversion::convert_lead_to_organization(db.as_ref(), &actor, lead_id, Utc::now())
                .await,
        )?;
        Ok(converted.into())
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Role {
    Owner,
    Admin,
    Sales,
    Viewer,
}

impl From<user::Role> for Role {
    fn from(value: user::Role) -> Self {
        match value {
            user::Role::Owner => Role::Owner,
            user::Role::Admin => Role::Admin,
            user::Role::Sales => Role::Sales,
            user::Role::Viewer => Role::Viewer,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CadenceStatus {
    Active,
    Inactive,
}

impl From<cadence::Status> for CadenceStatus {
    fn from(value: cadence::Status) -> Self {
        match value {
            cadence::Status::Active => CadenceStatus::Active,
            cadence::Status::Inactive => CadenceStatus::Inactive,
        }
    }
}

impl From<CadenceStatus> for cadence::Status {
    fn from(value: CadenceStatus) -> Self {
        match value {
            CadenceStatus::Active => cadence::Status::Active,
            CadenceStatus::Inactive => cadence::Status::Inactive,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum StepChannel {
    Email,
    Linkedin,
    Whatsapp,
    Call,
    Meeting,
    Instagram,
    Other,
}

impl From<cadence_step::Channel> for StepChannel {
    fn from(value: cadence_step::Channel) -> Self {
        match value {
            cadence_step::Channel::Email => StepChannel::Email,
            cadence_step::Channel::Linkedin => StepChannel::Linkedin,
            cadence_step::Channel::Whatsapp => StepChannel::Whatsapp,
            cadence_step::Channel::Call => StepChannel::Call,
            cadence_step::Channel::Meeting => StepChannel::Meeting,
            cadence_step::Channel::Instagram => StepChannel::Instagram,
            cadence_step::Channel::Other => StepChannel::Other,
        }
    }
}

impl From<StepChannel> for cadence_step::Channel {
    fn from(value: StepChannel) -> Self {
        match value {
            StepChannel::Email => cadence_step::Channel::Email,
            StepChannel::Linkedin => cadence_step::Channel::Linkedin,
            StepChannel::Whatsapp => cadence_step::Channel::Whatsapp,
            StepChannel::Call => cadence_step::Channel::Call,
            StepChannel::Meeting => cadence_step::Channel::Meeting,
            StepChannel::Instagram => cadence_step::Channel::Instagram,
            StepChannel::Other => cadence_step::Channel::Other,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum LeadCadenceStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl From<lead_cadence::Status> for LeadCadenceStatus {
    fn from(value: lead_cadence::Status) -> Self {
        match value {
            lead_cadence::Status::Active => LeadCadenceStatus::Active,
            lead_cadence::Status::Paused => LeadCadenceStatus::Paused,
            lead_cadence::Status::Completed => LeadCadenceStatus::Completed,
            lead_cadence::Status::Cancelled => LeadCadenceStatus::Cancelled,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum ActivityKind {
    Email,
    Call,
    Meeting,
    Linkedin,
    Whatsapp,
    Instagram,
    Task,
}

impl From<entity::activity::Kind> for ActivityKind {
    fn from(value: entity::activity::Kind) -> Self {
        use entity::activity::Kind;
        match value {
            Kind::Email => ActivityKind::Email,
            Kind::Call => ActivityKind::Call,
            Kind::Meeting => ActivityKind::Meeting,
            Kind::Linkedin => ActivityKind::Linkedin,
            Kind::Whatsapp => ActivityKind::Whatsapp,
            Kind::Instagram => ActivityKind::Instagram,
            Kind::Task => ActivityKind::Task,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum EntityType {
    Lead,
    Contact,
    Organization,
    Partner,
    Deal,
}

impl From<EntityType> for shared_entity::EntityKind {
    fn from(value: EntityType) -> Self {
        match value {
            EntityType::Lead => shared_entity::EntityKind::Lead,
            EntityType::Contact => shared_entity::EntityKind::Contact,
            EntityType::Organization => shared_entity::EntityKind::Organization,
            EntityType::Partner => shared_entity::EntityKind::Partner,
            EntityType::Deal => shared_entity::EntityKind::Deal,
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct CadenceStepInput {
    pub day_number: i32,
    pub channel: StepChannel,
    pub subject: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

impl From<CadenceStepInput> for NewCadenceStep {
    fn from(value: CadenceStepInput) -> Self {
        NewCadenceStep {
            day_number: value.day_number,
            channel: value.channel.into(),
            subject: value.subject,
            description: value.description,
            sort_order: value.sort_order,
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct CreateCadenceInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub objective: Option<String>,
    #[graphql(default)]
    pub duration_days: i32,
    pub icp_id: Option<ID>,
    pub status: Option<CadenceStatus>,
    #[graphql(default)]
    pub steps: Vec<CadenceStepInput>,
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct UpdateCadenceInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub duration_days: Option<i32>,
    pub icp_id: Option<ID>,
    pub status: Option<CadenceStatus>,
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct CadenceFilterInput {
    pub status: Option<CadenceStatus>,
    pub icp_id: Option<ID>,
}

#[derive(InputObject, Clone, Debug)]
pub struct ApplyCadenceInput {
    pub lead_id: ID,
    pub cadence_id: ID,
    pub start_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct UserNode {
    pub id: ID,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<user::Model> for UserNode {
    fn from(model: user::Model) -> Self {
        Self {
            id: ID(model.id.to_string()),
            email: model.email,
            name: model.name,
            role: model.role.into(),
            is_active: model.is_active,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CadenceStepNode {
    pub id: ID,
    pub day_number: i32,
    pub channel: StepChannel,
    pub subject: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl From<cadence_step::Model> for CadenceStepNode {
    fn from(model: cadence_step::Model) -> Self {
        Self {
            id: ID(model.id.to_string()),
            day_number: model.day_number,
            channel: model.channel.into(),
            subject: model.subject,
            description: model.description,
            sort_order: model.sort_order,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CadenceNode {
    pub id: ID,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub duration_days: i32,
    pub icp_id: Option<ID>,
    pub status: CadenceStatus,
    pub owner_id: ID,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub steps: Vec<CadenceStepNode>,
}

impl From<CadenceWithSteps> for CadenceNode {
    fn from(value: CadenceWithSteps) -> Self {
        let CadenceWithSteps { cadence, steps } = value;
        Self {
            id: ID(cadence.id.to_string()),
            name: cadence.name,
            slug: cadence.slug,
            description: cadence.description,
            objective: cadence.objective,
            duration_days: cadence.duration_days,
            icp_id: cadence.icp_id.map(id_of),
            status: cadence.status.into(),
            owner_id: id_of(cadence.owner_id),
            created_at: utc(cadence.created_at),
            updated_at: utc(cadence.updated_at),
            steps: steps.into_iter().map(CadenceStepNode::from).collect(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct LeadCadenceNode {
    pub id: ID,
    pub lead_id: ID,
    pub cadence_id: ID,
    pub cadence_name: Option<String>,
    pub status: LeadCadenceStatus,
    pub start_date: NaiveDate,
    pub paused_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub current_step: i32,
    pub notes: Option<String>,
    pub owner_id: ID,
    pub total_steps: i32,
    pub completed_steps: i32,
    pub progress: i32,
}

impl From<LeadCadenceSummary> for LeadCadenceNode {
    fn from(value: LeadCadenceSummary) -> Self {
        let LeadCadenceSummary {
            instance,
            cadence,
            total_steps,
            completed_steps,
            progress,
        } = value;
        Self {
            id: id_of(instance.id),
            lead_id: id_of(instance.lead_id),
            cadence_id: id_of(instance.cadence_id),
            cadence_name: cadence.map(|c| c.name),
            status: instance.status.into(),
            start_date: instance.start_date,
            paused_at: instance.paused_at.map(utc),
            completed_at: instance.completed_at.map(utc),
            cancelled_at: instance.cancelled_at.map(utc),
            current_step: instance.current_step,
            notes: instance.notes,
            owner_id: id_of(instance.owner_id),
            total_steps,
            completed_steps,
            progress,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct ActivityNode {
    pub id: ID,
    pub kind: ActivityKind,
    pub subject: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub lead_id: Option<ID>,
    pub owner_id: ID,
}

impl From<entity::activity::Model> for ActivityNode {
    fn from(model: entity::activity::Model) -> Self {
        Self {
            id: id_of(model.id),
            kind: model.kind.into(),
            subject: model.subject,
            description: model.description,
            due_date: model.due_date,
            completed: model.completed,
            completed_at: model.completed_at.map(utc),
            lead_id: model.lead_id.map(id_of),
            owner_id: id_of(model.owner_id),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct ScheduledActivityNode {
    pub id: ID,
    pub day_number: i32,
    pub channel: StepChannel,
    pub sort_order: i32,
    pub scheduled_date: NaiveDate,
    pub activity: ActivityNode,
}

impl From<ScheduledStep> for ScheduledActivityNode {
    fn from(value: ScheduledStep) -> Self {
        Self {
            id: id_of(value.link.id),
            day_number: value.step.day_number,
            channel: value.step.channel.into(),
            sort_order: value.step.sort_order,
            scheduled_date: value.link.scheduled_date,
            activity: value.activity.into(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct SharedUserNode {
    pub share_id: ID,
    pub user: UserNode,
    pub shared_by: Option<UserNode>,
    pub shared_at: DateTime<Utc>,
}

impl From<SharedUser> for SharedUserNode {
    fn from(value: SharedUser) -> Self {
        Self {
            share_id: id_of(value.share_id),
            user: value.user.into(),
            shared_by: value.shared_by.map(UserNode::from),
            shared_at: value.shared_at,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
}

impl From<OperationOutcome> for OperationResult {
    fn from(value: OperationOutcome) -> Self {
        Self {
            success: value.success,
            message: value.message,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct OrganizationNode {
    pub id: ID,
    pub name: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source_lead_id: Option<ID>,
    pub owner_id: ID,
}

impl From<organization::Model> for OrganizationNode {
    fn from(model: organization::Model) -> Self {
        Self {
            id: id_of(model.id),
            name: model.name,
            legal_name: model.legal_name,
            tax_id: model.tax_id,
            website: model.website,
            email: model.email,
            phone: model.phone,
            city: model.city,
            state: model.state,
            source_lead_id: model.source_lead_id.map(id_of),
            owner_id: id_of(model.owner_id),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct ContactNode {
    pub id: ID,
    pub organization_id: Option<ID>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub linkedin: Option<String>,
    pub is_primary: bool,
    pub source_lead_contact_id: Option<ID>,
}

impl From<contact::Model> for ContactNode {
    fn from(model: contact::Model) -> Self {
        Self {
            id: id_of(model.id),
            organization_id: model.organization_id.map(id_of),
            name: model.name,
            email: model.email,
            phone: model.phone,
            job_title: model.job_title,
            linkedin: model.linkedin,
            is_primary: model.is_primary,
            source_lead_contact_id: model.source_lead_contact_id.map(id_of),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct ConversionPayload {
    pub organization: OrganizationNode,
    pub contacts: Vec<ContactNode>,
}

impl From<Conversion> for ConversionPayload {
    fn from(value: Conversion) -> Self {
        Self {
            organization: value.organization.into(),
            contacts: value.contacts.into_iter().map(ContactNode::from).collect(),
        }
    }
}

async fn lead_cadence_node(
    db: &DatabaseConnection,
    instance: lead_cadence::Model,
) -> async_graphql::Result<LeadCadenceNode> {
    let summary = gql(engine::summarize_one(db, instance).await)?;
    Ok(summary.into())
}

fn database(ctx: &Context<'_>) -> async_graphql::Result<Arc<DatabaseConnection>> {
    ctx.data::<Arc<DatabaseConnection>>()
        .cloned()
        .map_err(|_| ApiError::internal(anyhow::anyhow!("missing database connection")).extend())
}

fn current_actor(ctx: &Context<'_>) -> async_graphql::Result<Actor> {
    ctx.data_opt::<Actor>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized.extend())
}

fn parse_uuid(id: &ID) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| ApiError::invalid("ID inválido").extend())
}

fn gql<T>(result: ApiResult<T>) -> async_graphql::Result<T> {
    result.map_err(|err| err.extend())
}

fn id_of(id: Uuid) -> ID {
    ID(id.to_string())
}

fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}
