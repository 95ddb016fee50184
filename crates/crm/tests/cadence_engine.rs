mod common;

use common::{at, date, TestCrm, ADMIN, SALES, SALES2, VIEWER};
use crm::{
    activity::set_activity_completed,
    cadence::{
        definition::{self, CadenceChanges},
        engine::{self, ApplyCadence},
    },
    sharing::share_entity,
    ApiError,
};
use chrono::NaiveDate;
use entity::{activity, cadence, lead_cadence, lead_cadence_activity, shared_entity::EntityKind};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

async fn row_counts(db: &DatabaseConnection) -> (u64, u64) {
    let activities = activity::Entity::find().count(db).await.unwrap();
    let links = lead_cadence_activity::Entity::find().count(db).await.unwrap();
    (activities, links)
}

#[tokio::test]
async fn applying_outbound_schedules_one_activity_per_step() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;

    assert_eq!(instance.status, lead_cadence::Status::Active);
    assert_eq!(instance.current_step, 0);
    assert_eq!(instance.owner_id, env.user_id(SALES));
    assert_eq!(instance.notes.as_deref(), Some("primeiro contato"));

    let scheduled =
        engine::get_lead_cadence_activities(env.conn(), &env.actor(SALES), instance.id)
            .await
            .unwrap();
    let plan: Vec<_> = scheduled
        .iter()
        .map(|s| (s.step.day_number, s.activity.kind, s.activity.due_date))
        .collect();
    assert_eq!(
        plan,
        vec![
            (0, activity::Kind::Email, date(2024, 1, 1)),
            (2, activity::Kind::Call, date(2024, 1, 3)),
            (5, activity::Kind::Linkedin, date(2024, 1, 6)),
        ]
    );
    for step in &scheduled {
        assert_eq!(step.link.scheduled_date, step.activity.due_date);
        assert_eq!(step.activity.lead_id, Some(env.seeded.lead.id));
        assert_eq!(step.activity.owner_id, env.user_id(SALES));
        assert!(!step.activity.completed);
    }
    assert_eq!(scheduled[0].activity.subject, "E-mail de apresentação");

    let summaries = engine::get_lead_cadences(env.conn(), &env.actor(SALES), env.seeded.lead.id)
        .await
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_steps, 3);
    assert_eq!(summaries[0].completed_steps, 0);
    assert_eq!(summaries[0].progress, 0);
    assert_eq!(
        summaries[0].cadence.as_ref().map(|c| c.name.as_str()),
        Some("Outbound-5")
    );
}

#[tokio::test]
async fn running_cadence_cannot_be_applied_twice() {
    let env = TestCrm::new().await;
    let first = env.apply_outbound(date(2024, 1, 1)).await;
    let before = row_counts(env.conn()).await;

    let again = engine::apply_cadence_to_lead(
        env.conn(),
        &env.actor(SALES),
        ApplyCadence {
            lead_id: env.seeded.lead.id,
            cadence_id: env.seeded.cadence.id,
            start_date: date(2024, 2, 1),
            notes: None,
        },
        at(2024, 1, 2, 8),
    )
    .await
    .unwrap_err();
    assert!(matches!(again, ApiError::Conflict(ref msg) if msg == engine::ALREADY_RUNNING));
    assert_eq!(row_counts(env.conn()).await, before);

    engine::pause_lead_cadence(env.conn(), &env.actor(SALES), first.id, at(2024, 1, 2, 9))
        .await
        .unwrap();
    let while_paused = engine::apply_cadence_to_lead(
        env.conn(),
        &env.actor(SALES),
        ApplyCadence {
            lead_id: env.seeded.lead.id,
            cadence_id: env.seeded.cadence.id,
            start_date: date(2024, 2, 1),
            notes: None,
        },
        at(2024, 1, 2, 10),
    )
    .await
    .unwrap_err();
    assert!(matches!(while_paused, ApiError::Conflict(_)));
    assert_eq!(row_counts(env.conn()).await, before);

    engine::cancel_lead_cadence(env.conn(), &env.actor(SALES), first.id, at(2024, 1, 3, 9))
        .await
        .unwrap();
    let second = env.apply_outbound(date(2024, 2, 1)).await;
    assert_ne!(second.id, first.id);

    let summaries = engine::get_lead_cadences(env.conn(), &env.actor(SALES), env.seeded.lead.id)
        .await
        .unwrap();
    assert_eq!(summaries.len(), 2);
}

#[tokio::test]
async fn resume_shifts_only_pending_future_activities() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;
    let sales = env.actor(SALES);

    let paused = engine::pause_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 2, 9))
        .await
        .unwrap();
    assert_eq!(paused.status, lead_cadence::Status::Paused);
    assert!(paused.paused_at.is_some());

    let resumed = engine::resume_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 4, 9))
        .await
        .unwrap();
    assert_eq!(resumed.status, lead_cadence::Status::Active);
    assert!(resumed.paused_at.is_none());

    let dues: Vec<_> = engine::get_lead_cadence_activities(env.conn(), &sales, instance.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.activity.due_date)
        .collect();
    assert_eq!(
        dues,
        vec![date(2024, 1, 1), date(2024, 1, 5), date(2024, 1, 8)]
    );
}

#[tokio::test]
async fn quick_pause_and_resume_keeps_the_schedule() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;
    let sales = env.actor(SALES);

    engine::pause_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 2, 9))
        .await
        .unwrap();
    let resumed_at = at(2024, 1, 2, 9) + chrono::Duration::minutes(5);
    let resumed = engine::resume_lead_cadence(env.conn(), &sales, instance.id, resumed_at)
        .await
        .unwrap();
    assert_eq!(resumed.status, lead_cadence::Status::Active);

    let dues: Vec<_> = engine::get_lead_cadence_activities(env.conn(), &sales, instance.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.activity.due_date)
        .collect();
    assert_eq!(
        dues,
        vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 6)]
    );
}

#[tokio::test]
async fn schedule_past_the_calendar_is_rejected_without_writes() {
    let env = TestCrm::new().await;
    let before = row_counts(env.conn()).await;

    let err = engine::apply_cadence_to_lead(
        env.conn(),
        &env.actor(SALES),
        ApplyCadence {
            lead_id: env.seeded.lead.id,
            cadence_id: env.seeded.cadence.id,
            start_date: NaiveDate::MAX,
            notes: None,
        },
        at(2024, 1, 1, 8),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(ref msg) if msg == engine::DATE_OUT_OF_RANGE));

    assert_eq!(row_counts(env.conn()).await, before);
    let summaries = engine::get_lead_cadences(env.conn(), &env.actor(SALES), env.seeded.lead.id)
        .await
        .unwrap();
    assert!(summaries.is_empty());
}

#[tokio::test]
async fn resume_leaves_completed_activities_in_place() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;
    let sales = env.actor(SALES);
    let scheduled = engine::get_lead_cadence_activities(env.conn(), &sales, instance.id)
        .await
        .unwrap();
    set_activity_completed(
        env.conn(),
        &sales,
        scheduled[1].activity.id,
        true,
        at(2024, 1, 1, 12),
    )
    .await
    .unwrap();

    engine::pause_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 2, 9))
        .await
        .unwrap();
    engine::resume_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 5, 9))
        .await
        .unwrap();

    let dues: Vec<_> = engine::get_lead_cadence_activities(env.conn(), &sales, instance.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.activity.due_date)
        .collect();
    assert_eq!(
        dues,
        vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 9)]
    );
}

#[tokio::test]
async fn terminal_states_reject_further_transitions() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;
    let sales = env.actor(SALES);

    let err = engine::resume_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 2, 9))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONFLICT");

    engine::pause_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 2, 9))
        .await
        .unwrap();
    let err = engine::complete_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 2, 10))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Só é possível concluir uma cadência ativa");

    let cancelled =
        engine::cancel_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 3, 9))
            .await
            .unwrap();
    assert_eq!(cancelled.status, lead_cadence::Status::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    for result in [
        engine::pause_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 4, 9)).await,
        engine::resume_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 4, 9)).await,
        engine::cancel_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 4, 9)).await,
        engine::complete_lead_cadence(env.conn(), &sales, instance.id, at(2024, 1, 4, 9)).await,
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Cadência já finalizada");
    }
}

#[tokio::test]
async fn manual_completion_ignores_open_steps() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;
    let completed = engine::complete_lead_cadence(
        env.conn(),
        &env.actor(SALES),
        instance.id,
        at(2024, 1, 2, 9),
    )
    .await
    .unwrap();
    assert_eq!(completed.status, lead_cadence::Status::Completed);
    assert!(completed.completed_at.is_some());

    let summary = engine::summarize_one(env.conn(), completed).await.unwrap();
    assert_eq!(summary.completed_steps, 0);
    assert_eq!(summary.progress, 0);
}

#[tokio::test]
async fn completing_activities_moves_cursor_and_progress() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;
    let sales = env.actor(SALES);
    let scheduled = engine::get_lead_cadence_activities(env.conn(), &sales, instance.id)
        .await
        .unwrap();

    let done = set_activity_completed(
        env.conn(),
        &sales,
        scheduled[0].activity.id,
        true,
        at(2024, 1, 1, 15),
    )
    .await
    .unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());

    let summary = engine::get_lead_cadences(env.conn(), &sales, env.seeded.lead.id)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(summary.instance.current_step, 1);
    assert_eq!(summary.completed_steps, 1);
    assert_eq!(summary.progress, 33);

    set_activity_completed(
        env.conn(),
        &sales,
        scheduled[2].activity.id,
        true,
        at(2024, 1, 6, 15),
    )
    .await
    .unwrap();
    let summary = engine::get_lead_cadences(env.conn(), &sales, env.seeded.lead.id)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(summary.instance.current_step, 1);
    assert_eq!(summary.progress, 67);
    assert_eq!(summary.instance.status, lead_cadence::Status::Active);

    let reopened = set_activity_completed(
        env.conn(),
        &sales,
        scheduled[0].activity.id,
        false,
        at(2024, 1, 7, 9),
    )
    .await
    .unwrap();
    assert!(!reopened.completed);
    assert!(reopened.completed_at.is_none());
    let summary = engine::get_lead_cadences(env.conn(), &sales, env.seeded.lead.id)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(summary.instance.current_step, 0);
    assert_eq!(summary.completed_steps, 1);

    for step in &scheduled {
        set_activity_completed(env.conn(), &sales, step.activity.id, true, at(2024, 1, 8, 9))
            .await
            .unwrap();
    }
    let summary = engine::get_lead_cadences(env.conn(), &sales, env.seeded.lead.id)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(summary.completed_steps, 3);
    assert_eq!(summary.progress, 100);
    assert_eq!(summary.instance.current_step, 3);
    assert_eq!(summary.instance.status, lead_cadence::Status::Active);
}

#[tokio::test]
async fn other_users_cannot_touch_the_activities() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;
    let scheduled =
        engine::get_lead_cadence_activities(env.conn(), &env.actor(SALES), instance.id)
            .await
            .unwrap();

    let err = set_activity_completed(
        env.conn(),
        &env.actor(SALES2),
        scheduled[0].activity.id,
        true,
        at(2024, 1, 1, 15),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let by_admin = set_activity_completed(
        env.conn(),
        &env.actor(ADMIN),
        scheduled[0].activity.id,
        true,
        at(2024, 1, 1, 15),
    )
    .await
    .unwrap();
    assert!(by_admin.completed);
}

#[tokio::test]
async fn apply_respects_roles_and_lead_ownership() {
    let env = TestCrm::new().await;
    let input = ApplyCadence {
        lead_id: env.seeded.lead.id,
        cadence_id: env.seeded.cadence.id,
        start_date: date(2024, 1, 1),
        notes: None,
    };

    let err = engine::apply_cadence_to_lead(
        env.conn(),
        &env.actor(VIEWER),
        input.clone(),
        at(2024, 1, 1, 8),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));

    let err = engine::apply_cadence_to_lead(
        env.conn(),
        &env.actor(SALES2),
        input.clone(),
        at(2024, 1, 1, 8),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let by_admin =
        engine::apply_cadence_to_lead(env.conn(), &env.actor(ADMIN), input, at(2024, 1, 1, 8))
            .await
            .unwrap();
    assert_eq!(by_admin.owner_id, env.user_id(ADMIN));
}

#[tokio::test]
async fn inactive_cadence_cannot_be_applied() {
    let env = TestCrm::new().await;
    definition::update_cadence(
        env.conn(),
        &env.actor(ADMIN),
        env.seeded.cadence.id,
        CadenceChanges {
            status: Some(cadence::Status::Inactive),
            ..Default::default()
        },
        at(2024, 1, 1, 7),
    )
    .await
    .unwrap();

    let err = engine::apply_cadence_to_lead(
        env.conn(),
        &env.actor(SALES),
        ApplyCadence {
            lead_id: env.seeded.lead.id,
            cadence_id: env.seeded.cadence.id,
            start_date: date(2024, 1, 1),
            notes: None,
        },
        at(2024, 1, 1, 8),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(ref msg) if msg == engine::CADENCE_INACTIVE));
}

#[tokio::test]
async fn shared_lead_is_readable_but_not_writable() {
    let env = TestCrm::new().await;
    let instance = env.apply_outbound(date(2024, 1, 1)).await;
    let sales2 = env.actor(SALES2);

    let err = engine::get_lead_cadences(env.conn(), &sales2, env.seeded.lead.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    share_entity(
        env.conn(),
        &env.actor(ADMIN),
        EntityKind::Lead,
        env.seeded.lead.id,
        sales2.user_id,
        at(2024, 1, 1, 9),
    )
    .await
    .unwrap();

    let visible = engine::get_lead_cadences(env.conn(), &sales2, env.seeded.lead.id)
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    let scheduled = engine::get_lead_cadence_activities(env.conn(), &sales2, instance.id)
        .await
        .unwrap();
    assert_eq!(scheduled.len(), 3);

    let err = engine::pause_lead_cadence(env.conn(), &sales2, instance.id, at(2024, 1, 2, 9))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Cadência do lead não encontrada"));
}
