use std::time::Duration;

use tower::{Service, ServiceBuilder, timeout::TimeoutLayer};

use super::fixtures::{
    ADMIRAL, CADET, CAPTAIN, ENGINEERING, LIEUTENANT, NAVIGATION, SCIENCE, fleet_reference,
};
use crate::{
    registry::{
        SpacefarerApiDefaultStack,
        api::{SpacefarerRequest, SpacefarerResponse},
        error::SpacefarerError,
        handler::HandlerConfig,
        infrastructure::model::{SpacefarerDraft, SpacefarerPatch},
        init_registry,
    },
    transport::{loopback::MailLoopback, nop::MailNop},
};

fn loopback_registry() -> (SpacefarerApiDefaultStack<MailLoopback>, MailLoopback) {
    let outbox = MailLoopback::default();
    (init_registry(fleet_reference(), outbox.clone(), HandlerConfig::default()), outbox)
}

#[tokio::test]
async fn integration_create_spacefarer_with_valid_data() {
    crate::spacefarer_tracing::init();
    let (mut registry, outbox) = loopback_registry();

    let created = create!(
        registry,
        SpacefarerDraft::new("John Doe", "john@doe.gal", 150)
            .with_id(1)
            .with_rank(LIEUTENANT)
            .with_department(ENGINEERING)
            .with_origin_planet("Earth")
            .with_spacesuit_color("Blue")
            .with_mission_status("PREPARING")
    );
    assert_eq!(created.id, 1);

    let stored = get!(registry, 1).unwrap();
    assert_eq!(stored.name, "John Doe");
    assert_eq!(stored.rank_id, Some(LIEUTENANT));
    assert_eq!(stored.wormhole_navigation_skill, Some(1));
    assert_eq!(stored.origin_planet.as_deref(), Some("Earth"));
    assert_eq!(outbox.sent().len(), 1);
}

#[tokio::test]
async fn integration_create_rejects_unknown_rank() {
    crate::spacefarer_tracing::init();
    let (mut registry, outbox) = loopback_registry();

    let result = registry
        .call(SpacefarerRequest::Create(
            SpacefarerDraft::new("Jane Doe", "jane@doe.gal", 100)
                .with_id(2)
                .with_rank(999)
                .with_department(ENGINEERING)
                .with_origin_planet("Mars"),
        ))
        .await;

    assert!(
        result.as_ref().unwrap_err().to_string().contains("Rank 999 does not exits"),
        "{result:?}"
    );
    assert_rejected!(result, "Rank 999 does not exits. Contact Admin to create it first.");
    assert_eq!(get!(registry, 2), None);
    assert!(outbox.sent().is_empty());
}

#[tokio::test]
async fn integration_create_rejects_every_missing_reference() {
    crate::spacefarer_tracing::init();
    let (mut registry, _) = loopback_registry();

    let result = registry
        .call(SpacefarerRequest::Create(
            SpacefarerDraft::new("Jane Doe", "jane@doe.gal", 100)
                .with_rank(999)
                .with_department(77),
        ))
        .await;

    assert_rejected!(
        result,
        "Rank 999 does not exits. Contact Admin to create it first.",
        "Department 77 does not exits. Contact Admin to create it first.",
    );
}

#[tokio::test]
async fn integration_create_fails_on_insufficient_stardust() {
    crate::spacefarer_tracing::init();
    let (mut registry, outbox) = loopback_registry();

    let err = registry
        .call(SpacefarerRequest::Create(
            SpacefarerDraft::new("Bob Smith", "bob@smith.gal", 50)
                .with_id(3)
                .with_rank(CAPTAIN)
                .with_department(ENGINEERING)
                .with_origin_planet("Venus"),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Insufficent stardust collection for rank Captain");
    assert_eq!(get!(registry, 3), None);
    assert!(outbox.sent().is_empty());
}

#[tokio::test]
async fn integration_create_assigns_highest_valid_rank() {
    crate::spacefarer_tracing::init();
    let (mut registry, _) = loopback_registry();

    create!(
        registry,
        SpacefarerDraft::new("Alice Johnson", "alice@johnson.gal", 600)
            .with_id(4)
            .with_department(SCIENCE)
            .with_origin_planet("Jupiter")
    );

    assert_eq!(get!(registry, 4).unwrap().rank_id, Some(CAPTAIN));
}

#[tokio::test]
async fn integration_create_sends_confirmation() {
    crate::spacefarer_tracing::init();
    let (mut registry, outbox) = loopback_registry();

    create!(registry, SpacefarerDraft::new("John Doe", "a@b.c", 0));

    let sent = outbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@b.c");
    assert_eq!(sent[0].subject, "Your spacefarer application was succesful");
    assert!(sent[0].text.contains("Dear John Doe,"));
}

#[tokio::test]
async fn integration_create_batch() {
    crate::spacefarer_tracing::init();
    let (mut registry, outbox) = loopback_registry();

    let SpacefarerResponse::StoredBatch(created) = registry
        .call(SpacefarerRequest::CreateBatch(vec![
            SpacefarerDraft::new("Spacefarer 1", "one@fleet.gal", 50)
                .with_id(10)
                .with_department(ENGINEERING)
                .with_origin_planet("Earth"),
            SpacefarerDraft::new("Spacefarer 2", "two@fleet.gal", 200)
                .with_id(11)
                .with_department(SCIENCE)
                .with_origin_planet("Mars"),
        ]))
        .await
        .unwrap()
    else {
        panic!("Expected SpacefarerResponse::StoredBatch");
    };

    assert_eq!(created.iter().map(|s| (s.id, s.rank_id)).collect::<Vec<_>>(), vec![
        (10, Some(CADET)),
        (11, Some(LIEUTENANT))
    ]);
    assert_eq!(outbox.sent().len(), 2);
}

#[tokio::test]
async fn integration_create_batch_stops_at_first_failure() {
    crate::spacefarer_tracing::init();
    let (mut registry, _) = loopback_registry();

    let err = registry
        .call(SpacefarerRequest::CreateBatch(vec![
            SpacefarerDraft::new("Spacefarer 1", "one@fleet.gal", 50).with_id(20),
            SpacefarerDraft::new("Spacefarer 2", "two@fleet.gal", 50)
                .with_id(21)
                .with_rank(ADMIRAL),
            SpacefarerDraft::new("Spacefarer 3", "three@fleet.gal", 50).with_id(22),
        ]))
        .await
        .unwrap_err();

    assert_eq!(err, SpacefarerError::InsufficientStardust("Admiral".to_string()));
    let SpacefarerResponse::Spacefarers(stored) =
        registry.call(SpacefarerRequest::List).await.unwrap()
    else {
        panic!("Expected SpacefarerResponse::Spacefarers");
    };
    assert_eq!(stored.iter().map(|s| s.id).collect::<Vec<_>>(), vec![20]);
}

#[tokio::test]
async fn integration_create_duplicate_identifier() {
    crate::spacefarer_tracing::init();
    let (mut registry, _) = loopback_registry();

    create!(registry, SpacefarerDraft::new("John Doe", "john@doe.gal", 0).with_id(5));
    let err = registry
        .call(SpacefarerRequest::Create(
            SpacefarerDraft::new("John Doe", "john@doe.gal", 0).with_id(5),
        ))
        .await
        .unwrap_err();

    assert_eq!(err, SpacefarerError::DuplicateSpacefarer(5));
}

#[tokio::test]
async fn integration_update_spacefarer() {
    crate::spacefarer_tracing::init();
    let (mut registry, outbox) = loopback_registry();
    let created = create!(registry, SpacefarerDraft::new("John Doe", "john@doe.gal", 150));

    let SpacefarerResponse::Stored(updated) = registry
        .call(SpacefarerRequest::Update {
            id: created.id,
            patch: SpacefarerPatch {
                department_id: Some(NAVIGATION),
                mission_status: Some("IN_PROGRESS".to_string()),
                ..Default::default()
            },
        })
        .await
        .unwrap()
    else {
        panic!("Expected SpacefarerResponse::Stored");
    };

    assert_eq!(updated.department_id, Some(NAVIGATION));
    assert_eq!(updated.mission_status.as_deref(), Some("IN_PROGRESS"));
    assert_eq!(updated.rank_id, Some(LIEUTENANT));
    assert_eq!(updated.wormhole_navigation_skill, Some(1));
    // Updates are not confirmed by mail.
    assert_eq!(outbox.sent().len(), 1);
}

#[tokio::test]
async fn integration_update_does_not_recheck_eligibility() {
    crate::spacefarer_tracing::init();
    let (mut registry, _) = loopback_registry();
    let created = create!(registry, SpacefarerDraft::new("John Doe", "john@doe.gal", 150));

    registry
        .call(SpacefarerRequest::Update {
            id: created.id,
            patch: SpacefarerPatch { rank_id: Some(ADMIRAL), ..Default::default() },
        })
        .await
        .unwrap();

    assert_eq!(get!(registry, created.id).unwrap().rank_id, Some(ADMIRAL));
}

#[tokio::test]
async fn integration_update_rejects_missing_references() {
    crate::spacefarer_tracing::init();
    let (mut registry, _) = loopback_registry();
    let created = create!(registry, SpacefarerDraft::new("John Doe", "john@doe.gal", 150));

    let result = registry
        .call(SpacefarerRequest::Update {
            id: created.id,
            patch: SpacefarerPatch { department_id: Some(404), ..Default::default() },
        })
        .await;

    assert_rejected!(result, "Department 404 does not exits. Contact Admin to create it first.");
    assert_eq!(get!(registry, created.id).unwrap().department_id, None);
}

#[tokio::test]
async fn integration_update_unknown_spacefarer() {
    crate::spacefarer_tracing::init();
    let (mut registry, _) = loopback_registry();

    assert_eq!(
        registry
            .call(SpacefarerRequest::Update { id: 99, patch: SpacefarerPatch::default() })
            .await
            .unwrap_err(),
        SpacefarerError::SpacefarerNotFound(99)
    );
}

#[tokio::test]
async fn integration_notification_failure_keeps_spacefarer() {
    crate::spacefarer_tracing::init();
    let mut registry =
        init_registry(fleet_reference(), MailNop::failing("SMTP Error"), HandlerConfig::default());

    let err = registry
        .call(SpacefarerRequest::Create(
            SpacefarerDraft::new("John Doe", "john@doe.gal", 150).with_id(7),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Email sending failed");
    let stored = get!(registry, 7).unwrap();
    assert_eq!(stored.rank_id, Some(LIEUTENANT));
}

#[tokio::test]
async fn integration_timeout_during_notification_keeps_spacefarer() {
    crate::spacefarer_tracing::init();
    let registry =
        init_registry(fleet_reference(), MailLoopback::with_delay(200), HandlerConfig::default());
    let store = registry.store().clone();
    let mut registry = ServiceBuilder::new()
        .layer(TimeoutLayer::new(Duration::from_millis(20)))
        .service(registry);

    let err = registry
        .call(SpacefarerRequest::Create(
            SpacefarerDraft::new("John Doe", "john@doe.gal", 150).with_id(8),
        ))
        .await
        .unwrap_err();

    assert!(err.is::<tower::timeout::error::Elapsed>());
    assert!(store.get(8).is_some());
}

#[tokio::test]
async fn integration_concurrent_creates() {
    crate::spacefarer_tracing::init();
    let (registry, outbox) = loopback_registry();

    let tasks = (0..32i64)
        .map(|i| {
            let mut registry = registry.clone();
            tokio::spawn(async move {
                create!(
                    registry,
                    SpacefarerDraft::new(format!("Spacefarer {i}"), "crew@fleet.gal", i * 40)
                )
            })
        })
        .collect::<Vec<_>>();

    let mut ids = Vec::new();
    for task in tasks {
        let spacefarer = task.await.unwrap();
        assert!(spacefarer.rank_id.is_some());
        ids.push(spacefarer.id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 32);
    assert_eq!(outbox.sent().len(), 32);
}
