
mod registry;

use std::time::Duration;

use tower::{Service, ServiceBuilder, ServiceExt, timeout::TimeoutLayer};

use crate::{
    registry::{
        api::{ReferenceRequest, SpacefarerRequest, SpacefarerResponse},
        handler::HandlerConfig,
        infrastructure::model::{Department, Rank, SpacefarerDraft},
        init_registry, init_registry_with_smtp,
        services::reference::ReferenceService,
    },
    transport::{loopback::MailLoopback, smtp::MailerConfig},
};

#[tokio::test]
async fn integration_init_registry() {
    crate::spacefarer_tracing::init();
    let outbox = MailLoopback::default();
    let mut registry =
        init_registry(fixtures::fleet_reference(), outbox.clone(), HandlerConfig::default());

    let created = create!(registry, SpacefarerDraft::new("John Doe", "john@doe.gal", 1000));

    assert_eq!(created.id, 1);
    assert_eq!(created.rank_id, Some(fixtures::ADMIRAL));
    assert_eq!(get!(registry, 1), Some(created));
    assert_eq!(outbox.sent().len(), 1);
}

#[tokio::test]
async fn integration_init_registry_with_smtp() {
    crate::spacefarer_tracing::init();
    let mut registry = init_registry_with_smtp(
        fixtures::fleet_reference(),
        &MailerConfig::default(),
        HandlerConfig::default(),
    )
    .unwrap();

    // Nothing reaches the relay until a spacefarer is created.
    assert_eq!(
        registry.call(SpacefarerRequest::List).await.unwrap(),
        SpacefarerResponse::Spacefarers(Vec::new())
    );
}

#[tokio::test]
async fn integration_reference_seeded_by_admin() {
    crate::spacefarer_tracing::init();
    let mut reference = ReferenceService::default();
    let mut registry =
        init_registry(reference.clone(), MailLoopback::default(), HandlerConfig::default());

    let result = registry
        .call(SpacefarerRequest::Create(
            SpacefarerDraft::new("John Doe", "john@doe.gal", 10).with_rank(1).with_department(1),
        ))
        .await;
    assert_rejected!(
        result,
        "Rank 1 does not exits. Contact Admin to create it first.",
        "Department 1 does not exits. Contact Admin to create it first.",
    );

    reference.call(ReferenceRequest::InsertRank(Rank::new(1, "Cadet", 0))).await.unwrap();
    reference
        .call(ReferenceRequest::InsertDepartment(Department::new(1, "Engineering")))
        .await
        .unwrap();

    let created = create!(
        registry,
        SpacefarerDraft::new("John Doe", "john@doe.gal", 10).with_rank(1).with_department(1)
    );
    assert_eq!(created.rank_id, Some(1));
}

#[tokio::test]
async fn integration_registry_oneshot_behind_timeout() {
    crate::spacefarer_tracing::init();
    let outbox = MailLoopback::default();
    let registry =
        init_registry(fixtures::fleet_reference(), outbox.clone(), HandlerConfig::default());

    let response = ServiceBuilder::new()
        .layer(TimeoutLayer::new(Duration::from_secs(1)))
        .service(registry.clone())
        .oneshot(SpacefarerRequest::Create(
            SpacefarerDraft::new("John Doe", "john@doe.gal", 600).with_department(1),
        ))
        .await
        .unwrap();
    let SpacefarerResponse::Stored(created) = response else {
        panic!("Expected SpacefarerResponse::Stored");
    };
    assert_eq!(created.rank_id, Some(fixtures::CAPTAIN));

    // Without a timeout the registry is driven the same way.
    let response = registry.oneshot(SpacefarerRequest::Get(created.id)).await.unwrap();
    assert_eq!(response, SpacefarerResponse::Spacefarer(Some(created)));
    assert_eq!(outbox.sent().len(), 1);
}
