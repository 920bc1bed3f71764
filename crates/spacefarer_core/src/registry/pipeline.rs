use std::{future::Future, pin::Pin, task::Poll};

use tower::Service;
use tracing::{info, warn};

use crate::registry::{
    api::{
        NotificationRequest, NotificationResponse, ReferenceRequest, ReferenceResponse,
        SpacefarerRequest, SpacefarerResponse,
    },
    error::SpacefarerError,
    handler::SpacefarerHandler,
    infrastructure::{
        model::{Spacefarer, SpacefarerDraft, SpacefarerId, SpacefarerPatch},
        request::EntityRequest,
    },
    services::store::SpacefarerStore,
};

/// Registry API Service
///
/// Drives every spacefarer request through the validation hooks and the store:
/// before hook, persistence when the hook neither failed nor rejected the
/// request, then the after hook. A failing after hook is reported to the caller
/// but the spacefarer stays stored.
#[derive(Debug, Clone)]
pub struct SpacefarerApiService<R, N> {
    /// Stored spacefarers
    store: SpacefarerStore,
    /// Validation hooks
    handler: SpacefarerHandler<R, N>,
}

impl<R, N> SpacefarerApiService<R, N> {
    pub fn new(handler: SpacefarerHandler<R, N>) -> Self {
        Self { store: SpacefarerStore::default(), handler }
    }

    /// Uses an existing store, e.g. one shared with another stack.
    pub fn with_store(self, store: SpacefarerStore) -> Self {
        Self { store, ..self }
    }

    pub fn store(&self) -> &SpacefarerStore {
        &self.store
    }
}

impl<R, N> SpacefarerApiService<R, N>
where
    R: Service<ReferenceRequest, Response = ReferenceResponse, Error = SpacefarerError>
        + Clone
        + Send
        + Sync
        + 'static,
    R::Future: Send,
    N: Service<NotificationRequest, Response = NotificationResponse, Error = SpacefarerError>
        + Clone
        + Send
        + Sync
        + 'static,
    N::Future: Send,
{
    async fn create(&self, draft: SpacefarerDraft) -> Result<Spacefarer, SpacefarerError> {
        let mut request = EntityRequest::new(draft);
        self.handler.before_create(&mut request).await?;
        let (draft, rejections) = request.into_parts();
        if !rejections.is_empty() {
            warn!("[registry] Create rejected: {:?}", rejections);
            return Err(SpacefarerError::Rejected(rejections));
        }

        let spacefarer = self.store.insert(draft)?;
        info!("[registry] Spacefarer created: {:?}", spacefarer);
        self.handler.after_create(&EntityRequest::new(spacefarer.clone())).await?;
        Ok(spacefarer)
    }

    async fn update(
        &self,
        id: SpacefarerId,
        patch: SpacefarerPatch,
    ) -> Result<Spacefarer, SpacefarerError> {
        let mut request = EntityRequest::new(patch);
        self.handler.before_update(&mut request).await?;
        let (patch, rejections) = request.into_parts();
        if !rejections.is_empty() {
            warn!("[registry] Update of {} rejected: {:?}", id, rejections);
            return Err(SpacefarerError::Rejected(rejections));
        }

        let spacefarer = self.store.update(id, patch)?;
        info!("[registry] Spacefarer updated: {:?}", spacefarer);
        Ok(spacefarer)
    }
}

impl<R, N> Service<SpacefarerRequest> for SpacefarerApiService<R, N>
where
    R: Service<ReferenceRequest, Response = ReferenceResponse, Error = SpacefarerError>
        + Clone
        + Send
        + Sync
        + 'static,
    R::Future: Send,
    N: Service<NotificationRequest, Response = NotificationResponse, Error = SpacefarerError>
        + Clone
        + Send
        + Sync
        + 'static,
    N::Future: Send,
{
    type Response = SpacefarerResponse;
    type Error = SpacefarerError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: SpacefarerRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                SpacefarerRequest::Create(draft) => {
                    this.create(draft).await.map(SpacefarerResponse::Stored)
                }
                SpacefarerRequest::CreateBatch(drafts) => {
                    let mut created = Vec::with_capacity(drafts.len());
                    for draft in drafts {
                        created.push(this.create(draft).await?);
                    }
                    Ok(SpacefarerResponse::StoredBatch(created))
                }
                SpacefarerRequest::Update { id, patch } => {
                    this.update(id, patch).await.map(SpacefarerResponse::Stored)
                }
                SpacefarerRequest::Get(id) => {
                    Ok(SpacefarerResponse::Spacefarer(this.store.get(id)))
                }
                SpacefarerRequest::List => Ok(SpacefarerResponse::Spacefarers(this.store.list())),
            }
        })
    }
}
