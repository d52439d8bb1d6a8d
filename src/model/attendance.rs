use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Absent,
    OnTime,
    Late,
}

impl AttendanceStatus {
    /// On time when the check-in hour is strictly before `cutoff_hour`. Minutes are ignored.
    pub fn from_checkin(checkin: DateTime<Utc>, cutoff_hour: u32) -> Self {
        if checkin.hour() < cutoff_hour {
            AttendanceStatus::OnTime
        } else {
            AttendanceStatus::Late
        }
    }
}

/// One user's attendance for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "user_id": 42,
    "date": "2024-06-03",
    "checkin_time": "2024-06-03T08:30:00Z",
    "checkout_time": "2024-06-03T17:05:00Z",
    "status": "ON_TIME",
    "created_at": "2024-06-03T08:30:00Z"
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_time: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

/// Raw per-status tallies of stored records in a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub present: u32,
    pub on_time: u32,
    pub late: u32,
    pub absent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "from": "2024-06-01",
    "to": "2024-07-01",
    "present": 18,
    "on_time": 15,
    "late": 3,
    "absent": 2,
    "working_days": 20,
    "recorded_days": 19
}))]
pub struct AttendanceSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub present: u32,
    pub on_time: u32,
    pub late: u32,
    /// Working days without a check-in, including days with no stored record.
    pub absent: u32,
    pub working_days: u32,
    /// Days in range that have a stored record, whatever their status.
    pub recorded_days: u32,
}
