use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum RequestType {
    Leave,
    Overtime,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Approved and rejected requests never change again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A leave or overtime request and, once processed, who decided it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 12,
    "user_id": 42,
    "type": "LEAVE",
    "start_date": "2024-03-01T09:00:00Z",
    "end_date": "2024-03-02T17:00:00Z",
    "reason": "medical",
    "status": "APPROVED",
    "approver_id": 7,
    "created_at": "2024-02-27T10:00:00Z",
    "updated_at": "2024-02-28T08:15:00Z",
    "user_name": "Jane Doe",
    "approver_name": "Sam Lee"
}))]
pub struct Request {
    pub id: u64,
    pub user_id: u64,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: String,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver_name: Option<String>,
}

/// Validated input for a new request.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub user_id: u64,
    pub request_type: RequestType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: String,
}

/// Approved and rejected tallies over an `updated_at` window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessedCounts {
    pub approved: u32,
    pub rejected: u32,
}

/// Request counts for a window.
///
/// `pending` is keyed on creation time while `approved`/`rejected` are keyed on the time of
/// the decision, so `total` adds counts taken against two different clocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({ "total": 9, "pending": 2, "approved": 6, "rejected": 1 }))]
pub struct RequestSummary {
    pub total: u32,
    pub pending: u32,
    pub approved: u32,
    pub rejected: u32,
}

impl RequestSummary {
    pub fn new(pending: u32, processed: ProcessedCounts) -> Self {
        Self {
            total: pending + processed.approved + processed.rejected,
            pending,
            approved: processed.approved,
            rejected: processed.rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_type_accepts_any_case() {
        assert_eq!("leave".parse::<RequestType>().unwrap(), RequestType::Leave);
        assert_eq!("OVERTIME".parse::<RequestType>().unwrap(), RequestType::Overtime);
        assert!("sick".parse::<RequestType>().is_err());
        assert_eq!(RequestType::Overtime.as_ref(), "OVERTIME");
    }

    #[test]
    fn only_pending_is_open() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert_eq!("REJECTED".parse::<RequestStatus>().unwrap(), RequestStatus::Rejected);
    }

    #[test]
    fn summary_total_adds_both_time_bases() {
        let summary = RequestSummary::new(2, ProcessedCounts { approved: 6, rejected: 1 });
        assert_eq!(
            summary,
            RequestSummary { total: 9, pending: 2, approved: 6, rejected: 1 }
        );
    }
}
