//! Validation hooks for spacefarer requests.
//!
//! The handler is registered around the spacefarer store and runs:
//!
//! - **before create**: association checks, rank eligibility (or automatic
//!   rank assignment) and the basic wormhole navigation training
//! - **before update**: association checks only
//! - **after create**: confirmation message to the new spacefarer
//!
//! Two failure channels are kept apart. A missing rank or department is a
//! client error recorded with [`EntityRequest::reject`]: the hook keeps going
//! and every association is checked. An explicitly requested rank the
//! spacefarer is not eligible for is a hard failure returned as
//! [`SpacefarerError::InsufficientStardust`]. Errors from the reference or
//! notification services are passed through unchanged.
use std::time::Duration;

use tower::{Service, ServiceExt};
use tracing::info;

use crate::registry::{
    api::{NotificationRequest, NotificationResponse, ReferenceRequest, ReferenceResponse},
    error::SpacefarerError,
    infrastructure::{
        model::{
            BASIC_WORMHOLE_NAVIGATION_SKILL, Department, DepartmentId, Rank, RankId,
            ReferenceKind, Spacefarer, SpacefarerDraft, SpacefarerPatch,
        },
        request::{BAD_REQUEST, EntityRequest},
    },
};

/// Payloads referencing a rank and a department.
pub trait Associations {
    fn rank_id(&self) -> Option<RankId>;
    fn department_id(&self) -> Option<DepartmentId>;
}

impl Associations for SpacefarerDraft {
    fn rank_id(&self) -> Option<RankId> {
        self.rank_id
    }

    fn department_id(&self) -> Option<DepartmentId> {
        self.department_id
    }
}

impl Associations for SpacefarerPatch {
    fn rank_id(&self) -> Option<RankId> {
        self.rank_id
    }

    fn department_id(&self) -> Option<DepartmentId> {
        self.department_id
    }
}

/// Message of the rejection raised for a dangling reference.
pub fn missing_reference_message(kind: ReferenceKind, id: u32) -> String {
    format!("{kind} {id} does not exits. Contact Admin to create it first.")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerConfig {
    /// Duration of the basic wormhole navigation training, disabled if 0.
    pub training_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SpacefarerHandler<R, N> {
    config: HandlerConfig,
    /// Rank and department lookups
    reference: R,
    /// Confirmation messages
    notification: N,
}

impl<R, N> SpacefarerHandler<R, N> {
    pub fn new(reference: R, notification: N) -> Self {
        Self { config: HandlerConfig::default(), reference, notification }
    }

    pub fn with_config(self, config: HandlerConfig) -> Self {
        Self { config, ..self }
    }
}

impl<R, N> SpacefarerHandler<R, N>
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
    /// Validates and completes a create payload.
    ///
    /// Stops right after the association checks if they rejected the request.
    /// On success the payload holds a rank the spacefarer is eligible for and a
    /// wormhole navigation skill.
    pub async fn before_create(
        &self,
        request: &mut EntityRequest<SpacefarerDraft>,
    ) -> Result<(), SpacefarerError> {
        info!("[handler] Incoming create Spacefarer request: {:?}", request.data);
        self.validate_associations(request).await?;
        if request.is_rejected() {
            return Ok(());
        }

        let collected_stardust = request.data.collected_stardust;
        match request.data.rank_id {
            Some(rank_id) => self.validate_rank(collected_stardust, rank_id).await?,
            None => {
                let rank = self.find_highest_valid_rank(collected_stardust).await?;
                info!("[handler] Assigned rank {} ({})", rank.id, rank.title);
                request.data.rank_id = Some(rank.id);
            }
        }

        if request.data.wormhole_navigation_skill.is_none() {
            request.data.wormhole_navigation_skill =
                Some(self.enhance_wormhole_navigation_skills().await);
        }
        Ok(())
    }

    /// Validates an update payload. Only the references are checked.
    pub async fn before_update(
        &self,
        request: &mut EntityRequest<SpacefarerPatch>,
    ) -> Result<(), SpacefarerError> {
        info!("[handler] Incoming update Spacefarer request: {:?}", request.data);
        self.validate_associations(request).await
    }

    /// Sends the application confirmation for a stored spacefarer.
    pub async fn after_create(
        &self,
        request: &EntityRequest<Spacefarer>,
    ) -> Result<(), SpacefarerError> {
        self.notification
            .clone()
            .oneshot(NotificationRequest::Confirm {
                email: request.data.email.clone(),
                name: request.data.name.clone(),
            })
            .await?;
        info!("[handler] Processed Spacefarer create request: {:?}", request.data);
        Ok(())
    }

    /// Rejects the request for every referenced rank or department that does
    /// not exist. Both references are always looked up.
    pub async fn validate_associations<T: Associations>(
        &self,
        request: &mut EntityRequest<T>,
    ) -> Result<(), SpacefarerError> {
        if let Some(rank_id) = request.data.rank_id()
            && self.get_rank(rank_id).await?.is_none()
        {
            request.reject(BAD_REQUEST, missing_reference_message(ReferenceKind::Rank, rank_id));
        }
        if let Some(department_id) = request.data.department_id()
            && self.get_department(department_id).await?.is_none()
        {
            request.reject(
                BAD_REQUEST,
                missing_reference_message(ReferenceKind::Department, department_id),
            );
        }
        Ok(())
    }

    async fn validate_rank(
        &self,
        collected_stardust: i64,
        rank_id: RankId,
    ) -> Result<(), SpacefarerError> {
        let rank = self.get_rank(rank_id).await?.ok_or(SpacefarerError::RankNotFound(rank_id))?;
        if rank.is_eligible(collected_stardust) {
            Ok(())
        } else {
            Err(SpacefarerError::InsufficientStardust(rank.title))
        }
    }

    async fn find_highest_valid_rank(
        &self,
        collected_stardust: i64,
    ) -> Result<Rank, SpacefarerError> {
        match self
            .reference
            .clone()
            .oneshot(ReferenceRequest::HighestEligibleRank(collected_stardust))
            .await?
        {
            ReferenceResponse::Rank(rank) => {
                rank.ok_or(SpacefarerError::NoEligibleRank(collected_stardust))
            }
            _ => Err(SpacefarerError::InternalRegistryError),
        }
    }

    async fn enhance_wormhole_navigation_skills(&self) -> u32 {
        if self.config.training_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.training_delay_ms)).await;
        }
        info!("[handler] Spacefarer candidate completed Wormhole Navigation Basic Training");
        BASIC_WORMHOLE_NAVIGATION_SKILL
    }

    async fn get_rank(&self, id: RankId) -> Result<Option<Rank>, SpacefarerError> {
        match self.reference.clone().oneshot(ReferenceRequest::GetRank(id)).await? {
            ReferenceResponse::Rank(rank) => Ok(rank),
            _ => Err(SpacefarerError::InternalRegistryError),
        }
    }

    async fn get_department(
        &self,
        id: DepartmentId,
    ) -> Result<Option<Department>, SpacefarerError> {
        match self.reference.clone().oneshot(ReferenceRequest::GetDepartment(id)).await? {
            ReferenceResponse::Department(department) => Ok(department),
            _ => Err(SpacefarerError::InternalRegistryError),
        }
    }
}
