use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::AppError;
use crate::model::request::{NewRequest, Request, RequestStatus, RequestSummary, RequestType};
use crate::store::RequestStore;

const NOT_PENDING: &str = "request is not pending";

/// Leave/overtime requests and their approval state machine.
///
/// PENDING is the only state with outgoing transitions: PENDING -> APPROVED and
/// PENDING -> REJECTED. Both are applied as a single conditional write, so two approvers
/// racing on the same request cannot both succeed.
pub struct RequestService<S> {
    store: S,
}

impl<S: RequestStore> RequestService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create_request(
        &self,
        user_id: u64,
        request_type: RequestType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Request, AppError> {
        if start_date >= end_date {
            return Err(AppError::validation("start must precede end"));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("reason is required"));
        }

        let request = self
            .store
            .create(
                NewRequest {
                    user_id,
                    request_type,
                    start_date,
                    end_date,
                    reason: reason.to_string(),
                },
                now,
            )
            .await?;

        info!(request_id = request.id, user_id, request_type = %request_type, "Request created");
        Ok(request)
    }

    pub async fn get_my_requests(&self, user_id: u64) -> Result<Vec<Request>, AppError> {
        self.store.find_by_user(user_id).await
    }

    /// All pending requests, oldest first.
    pub async fn get_pending_requests(&self) -> Result<Vec<Request>, AppError> {
        self.store.find_pending().await
    }

    pub async fn approve_request(
        &self,
        id: u64,
        approver_id: u64,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let applied = self
            .store
            .update_status_if_pending(id, RequestStatus::Approved, approver_id, None, now)
            .await?;
        if !applied {
            return Err(self.transition_failure(id).await);
        }

        info!(request_id = id, approver_id, "Request approved");
        Ok(())
    }

    pub async fn reject_request(
        &self,
        id: u64,
        approver_id: u64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            // unknown and already decided requests report that first
            self.ensure_pending(id).await?;
            return Err(AppError::validation("rejection reason is required"));
        }

        let applied = self
            .store
            .update_status_if_pending(id, RequestStatus::Rejected, approver_id, Some(reason), now)
            .await?;
        if !applied {
            return Err(self.transition_failure(id).await);
        }

        info!(request_id = id, approver_id, "Request rejected");
        Ok(())
    }

    /// System-wide counts over `[from, to)`.
    pub async fn get_summary_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<RequestSummary, AppError> {
        self.summarize(None, from, to).await
    }

    /// Counts over `[from, to)` for one requester.
    pub async fn get_my_summary_between(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<RequestSummary, AppError> {
        self.summarize(Some(user_id), from, to).await
    }

    /// Approved and rejected requests decided in `[from, to)`, newest decision first.
    pub async fn get_processed_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Request>, AppError> {
        self.store.find_processed_in_range(from, to).await
    }

    // Pending is counted by creation time, decisions by update time.
    async fn summarize(
        &self,
        user_id: Option<u64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<RequestSummary, AppError> {
        let pending = self.store.count_pending_created(user_id, from, to).await?;
        let processed = self.store.count_processed_updated(user_id, from, to).await?;

        Ok(RequestSummary::new(pending, processed))
    }

    async fn ensure_pending(&self, id: u64) -> Result<Request, AppError> {
        match self.store.find_by_id(id).await? {
            None => Err(AppError::not_found(format!("request {id} not found"))),
            Some(request) if request.status.is_terminal() => Err(AppError::conflict(NOT_PENDING)),
            Some(request) => Ok(request),
        }
    }

    // Explains why a conditional transition changed nothing.
    async fn transition_failure(&self, id: u64) -> AppError {
        match self.ensure_pending(id).await {
            Err(e) => e,
            Ok(_) => AppError::conflict(NOT_PENDING),
        }
    }
}
