//! Batch transitions
//!
//! Applies one target status to every request sharing a batch identifier.
//! The default policy is best-effort sequential: members already
//! transitioned stay transitioned when a later member fails, and the
//! remaining members are not attempted.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{request::LoanRequest, BatchPolicy, RequestStatus},
    repository::Repository,
};

use super::transitions::{edge_allowed, TransitionEngine};

/// Result of a fully applied batch transition
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    pub applied: usize,
    pub total: usize,
}

#[derive(Clone)]
pub struct BatchService {
    repository: Repository,
    engine: TransitionEngine,
    default_policy: BatchPolicy,
}

impl BatchService {
    pub fn new(
        repository: Repository,
        engine: TransitionEngine,
        default_policy: BatchPolicy,
    ) -> Self {
        Self {
            repository,
            engine,
            default_policy,
        }
    }

    /// Apply `target` to every member of the batch
    pub async fn apply_to_batch(
        &self,
        batch_id: Uuid,
        target: RequestStatus,
        policy: Option<BatchPolicy>,
        processed_by: Option<String>,
    ) -> AppResult<BatchOutcome> {
        let members = self.repository.requests.by_batch(batch_id).await?;
        if members.is_empty() {
            return Err(AppError::NotFound(format!(
                "No requests found for batch {}",
                batch_id
            )));
        }

        let policy = policy.unwrap_or(self.default_policy);
        if policy == BatchPolicy::AllOrNothing {
            self.prevalidate(&members, target).await?;
        }

        let total = members.len();
        let mut applied = 0;
        for member in &members {
            match self
                .engine
                .transition(member.id, target, processed_by.clone())
                .await
            {
                Ok(_) => applied += 1,
                Err(e) => {
                    return Err(AppError::BatchAborted {
                        applied,
                        total,
                        reason: e.to_string(),
                    })
                }
            }
        }

        Ok(BatchOutcome {
            batch_id,
            applied,
            total,
        })
    }

    /// Refuse the whole batch up front if any member would fail
    ///
    /// Advisory only: a concurrent reservation can still fail a member after
    /// prevalidation passed, in which case the run degrades to best-effort.
    async fn prevalidate(&self, members: &[LoanRequest], target: RequestStatus) -> AppResult<()> {
        for member in members {
            if !edge_allowed(member.status, target) {
                return Err(AppError::InvalidTransition {
                    from: member.status,
                    to: target,
                });
            }
        }

        if target == RequestStatus::Approved {
            let mut needed: HashMap<i32, i32> = HashMap::new();
            for member in members {
                *needed.entry(member.equipment_id).or_insert(0) += member.quantity;
            }
            for (equipment_id, qty) in needed {
                let available = self.repository.ledger.available(equipment_id).await?;
                if available < qty {
                    return Err(AppError::InsufficientStock {
                        equipment_id,
                        requested: qty,
                        available,
                    });
                }
            }
        }
        Ok(())
    }
}
