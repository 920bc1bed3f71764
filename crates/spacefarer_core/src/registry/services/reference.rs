//! Reference data service for ranks and departments.
//!
//! Holds the two reference tables the validation hooks read from. Lookups are
//! point queries by identifier, plus the top-1 query returning the highest
//! rank a given amount of stardust allows. Records are only inserted through
//! administrative requests, the hooks never write here.
use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use dashmap::DashMap;
use tower::Service;
use tracing::{debug, info};

use crate::registry::{
    api::{ReferenceRequest, ReferenceResponse},
    error::SpacefarerError,
    infrastructure::model::{Department, DepartmentId, Rank, RankId},
};

#[derive(Default, Debug, Clone)]
pub struct ReferenceService {
    ranks: Arc<DashMap<RankId, Rank>>,
    departments: Arc<DashMap<DepartmentId, Department>>,
}

impl ReferenceService {
    /// Creates a reference service pre-populated with the given records.
    pub fn new(
        ranks: impl IntoIterator<Item = Rank>,
        departments: impl IntoIterator<Item = Department>,
    ) -> Self {
        let service = Self::default();
        for rank in ranks {
            service.ranks.insert(rank.id, rank);
        }
        for department in departments {
            service.departments.insert(department.id, department);
        }
        service
    }

    fn get_rank(&self, id: RankId) -> Option<Rank> {
        self.ranks.get(&id).map(|rank| rank.value().clone())
    }

    fn get_department(&self, id: DepartmentId) -> Option<Department> {
        self.departments.get(&id).map(|department| department.value().clone())
    }

    /// Greatest required stardust not above `collected_stardust`.
    ///
    /// Ranks sharing the same threshold resolve to the lowest identifier.
    fn highest_eligible_rank(&self, collected_stardust: i64) -> Option<Rank> {
        self.ranks
            .iter()
            .filter(|rank| rank.is_eligible(collected_stardust))
            .map(|rank| rank.value().clone())
            .max_by(|a, b| {
                a.required_stardust.cmp(&b.required_stardust).then_with(|| b.id.cmp(&a.id))
            })
    }

    fn list_ranks(&self) -> Vec<Rank> {
        let mut ranks: Vec<Rank> = self.ranks.iter().map(|rank| rank.value().clone()).collect();
        ranks.sort_by(|a, b| {
            a.required_stardust.cmp(&b.required_stardust).then_with(|| a.id.cmp(&b.id))
        });
        ranks
    }
}

impl Service<ReferenceRequest> for ReferenceService {
    type Response = ReferenceResponse;
    type Error = SpacefarerError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ReferenceRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                ReferenceRequest::GetRank(id) => {
                    debug!("[reference] GetRank: {}", id);
                    Ok(ReferenceResponse::Rank(this.get_rank(id)))
                }
                ReferenceRequest::GetDepartment(id) => {
                    debug!("[reference] GetDepartment: {}", id);
                    Ok(ReferenceResponse::Department(this.get_department(id)))
                }
                ReferenceRequest::HighestEligibleRank(collected_stardust) => {
                    debug!("[reference] HighestEligibleRank: {}", collected_stardust);
                    Ok(ReferenceResponse::Rank(this.highest_eligible_rank(collected_stardust)))
                }
                ReferenceRequest::ListRanks => Ok(ReferenceResponse::Ranks(this.list_ranks())),
                ReferenceRequest::InsertRank(rank) => {
                    info!("[reference] InsertRank: {:?}", rank);
                    this.ranks.insert(rank.id, rank);
                    Ok(ReferenceResponse::Ack)
                }
                ReferenceRequest::InsertDepartment(department) => {
                    info!("[reference] InsertDepartment: {:?}", department);
                    this.departments.insert(department.id, department);
                    Ok(ReferenceResponse::Ack)
                }
            }
        })
    }
}
