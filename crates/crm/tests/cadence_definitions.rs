mod common;

use common::{at, date, TestCrm, ADMIN, SALES, SALES2, VIEWER};
use crm::{
    cadence::{
        definition::{self, CadenceChanges, CadenceFilter, NewCadence, NewCadenceStep},
        lifecycle::MAX_STEP_DAY,
        CADENCE_NOT_FOUND,
    },
    ApiError,
};
use entity::{cadence, cadence_step::Channel};

fn step(day_number: i32, channel: Channel, subject: &str) -> NewCadenceStep {
    NewCadenceStep {
        day_number,
        channel,
        subject: subject.into(),
        description: None,
        sort_order: None,
    }
}

fn reactivation() -> NewCadence {
    NewCadence {
        name: "  Reativação Q3  ".into(),
        slug: None,
        description: Some("Clientes inativos há seis meses".into()),
        objective: None,
        duration_days: 7,
        icp_id: None,
        status: None,
        steps: vec![
            step(3, Channel::Whatsapp, "Mensagem curta"),
            step(0, Channel::Email, "Novidades do produto"),
            step(0, Channel::Other, "Revisar histórico"),
        ],
    }
}

#[tokio::test]
async fn create_derives_slug_and_orders_steps() {
    let env = TestCrm::new().await;
    let created = definition::create_cadence(
        env.conn(),
        &env.actor(SALES),
        reactivation(),
        at(2024, 3, 1, 10),
    )
    .await
    .unwrap();

    assert_eq!(created.cadence.name, "Reativação Q3");
    assert_eq!(created.cadence.slug, "reativacao-q3");
    assert_eq!(created.cadence.status, cadence::Status::Active);
    assert_eq!(created.cadence.owner_id, env.user_id(SALES));
    let order: Vec<_> = created
        .steps
        .iter()
        .map(|s| (s.day_number, s.sort_order, s.subject.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (0, 1, "Novidades do produto"),
            (0, 2, "Revisar histórico"),
            (3, 0, "Mensagem curta"),
        ]
    );

    let fetched = definition::get_cadence(env.conn(), &env.actor(VIEWER), created.cadence.id)
        .await
        .unwrap();
    assert_eq!(fetched.steps.len(), 3);
    assert_eq!(fetched.steps[0].subject, "Novidades do produto");
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let env = TestCrm::new().await;
    let mut input = reactivation();
    input.slug = Some("Outbound 5".into());
    let err = definition::create_cadence(env.conn(), &env.actor(SALES), input, at(2024, 3, 1, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(ref msg) if msg == definition::SLUG_TAKEN));
}

#[tokio::test]
async fn invalid_input_is_rejected_before_writing() {
    let env = TestCrm::new().await;
    let sales = env.actor(SALES);

    let mut blank = reactivation();
    blank.name = "   ".into();
    let err = definition::create_cadence(env.conn(), &sales, blank, at(2024, 3, 1, 10))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");

    let mut negative = reactivation();
    negative.steps.push(step(-1, Channel::Call, "Antes do início"));
    let err = definition::create_cadence(env.conn(), &sales, negative, at(2024, 3, 1, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let all = definition::list_cadences(env.conn(), &sales, CadenceFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn step_days_beyond_the_limit_are_rejected() {
    let env = TestCrm::new().await;
    let sales = env.actor(SALES);

    let mut far = reactivation();
    far.steps.push(step(i32::MAX, Channel::Email, "Nunca chega"));
    let err = definition::create_cadence(env.conn(), &sales, far, at(2024, 3, 1, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = definition::replace_cadence_steps(
        env.conn(),
        &env.actor(ADMIN),
        env.seeded.cadence.id,
        vec![step(MAX_STEP_DAY + 1, Channel::Call, "Tarde demais")],
        at(2024, 3, 1, 10),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");

    let outbound = definition::get_cadence(env.conn(), &sales, env.seeded.cadence.id)
        .await
        .unwrap();
    assert_eq!(outbound.steps.len(), 3);
}

#[tokio::test]
async fn viewers_cannot_create_cadences() {
    let env = TestCrm::new().await;
    let err = definition::create_cadence(
        env.conn(),
        &env.actor(VIEWER),
        reactivation(),
        at(2024, 3, 1, 10),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));
}

#[tokio::test]
async fn only_owner_or_admin_may_update() {
    let env = TestCrm::new().await;
    let created = definition::create_cadence(
        env.conn(),
        &env.actor(SALES),
        reactivation(),
        at(2024, 3, 1, 10),
    )
    .await
    .unwrap();

    let err = definition::update_cadence(
        env.conn(),
        &env.actor(SALES2),
        created.cadence.id,
        CadenceChanges {
            name: Some("Roubada".into()),
            ..Default::default()
        },
        at(2024, 3, 2, 10),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));

    let updated = definition::update_cadence(
        env.conn(),
        &env.actor(ADMIN),
        created.cadence.id,
        CadenceChanges {
            objective: Some("Reabrir conversas".into()),
            duration_days: Some(10),
            ..Default::default()
        },
        at(2024, 3, 2, 10),
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Reativação Q3");
    assert_eq!(updated.objective.as_deref(), Some("Reabrir conversas"));
    assert_eq!(updated.duration_days, 10);
    assert!(updated.updated_at > created.cadence.updated_at);
}

#[tokio::test]
async fn steps_are_locked_once_a_lead_runs_the_cadence() {
    let env = TestCrm::new().await;
    let admin = env.actor(ADMIN);

    let replaced = definition::replace_cadence_steps(
        env.conn(),
        &admin,
        env.seeded.cadence.id,
        vec![
            step(0, Channel::Email, "Apresentação"),
            step(1, Channel::Meeting, "Reunião"),
        ],
        at(2024, 1, 1, 6),
    )
    .await
    .unwrap();
    assert_eq!(replaced.steps.len(), 2);
    let fetched = definition::get_cadence(env.conn(), &admin, env.seeded.cadence.id)
        .await
        .unwrap();
    assert_eq!(fetched.steps.len(), 2);
    assert_eq!(fetched.cadence.updated_at, replaced.cadence.updated_at);

    env.apply_outbound(date(2024, 1, 1)).await;
    let err = definition::replace_cadence_steps(
        env.conn(),
        &admin,
        env.seeded.cadence.id,
        vec![step(0, Channel::Email, "Outra")],
        at(2024, 1, 2, 6),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(ref msg) if msg == definition::STEPS_LOCKED));
}

#[tokio::test]
async fn delete_refuses_cadences_in_use() {
    let env = TestCrm::new().await;
    env.apply_outbound(date(2024, 1, 1)).await;
    let err = definition::delete_cadence(env.conn(), &env.actor(ADMIN), env.seeded.cadence.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(ref msg) if msg == definition::CADENCE_IN_USE));

    let created = definition::create_cadence(
        env.conn(),
        &env.actor(SALES),
        reactivation(),
        at(2024, 3, 1, 10),
    )
    .await
    .unwrap();
    definition::delete_cadence(env.conn(), &env.actor(SALES), created.cadence.id)
        .await
        .unwrap();
    let err = definition::get_cadence(env.conn(), &env.actor(SALES), created.cadence.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref msg) if msg == CADENCE_NOT_FOUND));
}

#[tokio::test]
async fn list_filters_by_status() {
    let env = TestCrm::new().await;
    let mut paused = reactivation();
    paused.status = Some(cadence::Status::Inactive);
    definition::create_cadence(env.conn(), &env.actor(SALES), paused, at(2024, 3, 1, 10))
        .await
        .unwrap();

    let viewer = env.actor(VIEWER);
    let all = definition::list_cadences(env.conn(), &viewer, CadenceFilter::default())
        .await
        .unwrap();
    let names: Vec<_> = all.iter().map(|c| c.cadence.name.as_str()).collect();
    assert_eq!(names, vec!["Outbound-5", "Reativação Q3"]);
    assert_eq!(all[0].steps.len(), 3);

    let inactive = definition::list_cadences(
        env.conn(),
        &viewer,
        CadenceFilter {
            status: Some(cadence::Status::Inactive),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].cadence.slug, "reativacao-q3");
}
