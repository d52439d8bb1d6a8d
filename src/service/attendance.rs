use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary};
use crate::store::AttendanceStore;
use crate::utils::clock;

/// Hour (UTC) from which a first check-in counts as late.
pub const DEFAULT_CHECKIN_CUTOFF_HOUR: u32 = 9;

/// Daily attendance: check-in/check-out and range reports.
pub struct AttendanceService<S> {
    store: S,
    cutoff_hour: u32,
}

impl<S: AttendanceStore> AttendanceService<S> {
    pub fn new(store: S, cutoff_hour: u32) -> Self {
        Self { store, cutoff_hour }
    }

    /// Returns today's record for the user, creating an ABSENT one if needed.
    pub async fn ensure_today(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        self.store.ensure_today(user_id, clock::today(now)).await
    }

    /// Records the first check-in of the day and derives on-time/late from it.
    ///
    /// Later check-ins on the same day keep the first timestamp, so the status they derive
    /// is the same one.
    pub async fn checkin(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        let today = self.ensure_today(user_id, now).await?.date;
        let record = self.store.set_checkin(user_id, today, now).await?;

        let effective = record.checkin_time.unwrap_or(now);
        let status = AttendanceStatus::from_checkin(effective, self.cutoff_hour);
        let record = if record.status == status {
            record
        } else {
            self.store.set_status(user_id, today, status).await?
        };

        info!(user_id, date = %today, status = %record.status, "Checked in");
        Ok(record)
    }

    /// Stamps the check-out time; the last call of the day wins.
    pub async fn checkout(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        let today = self.ensure_today(user_id, now).await?.date;
        let record = self.store.set_checkout(user_id, today, now).await?;

        info!(user_id, date = %today, "Checked out");
        Ok(record)
    }

    /// Attendance totals over `[from, to)`.
    ///
    /// Absence is derived from working days rather than stored ABSENT rows, so weekdays
    /// without any record count as absent too.
    pub async fn summary(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AttendanceSummary, AppError> {
        let counts = self.store.summary_in_range(user_id, from, to).await?;
        let recorded_days = self.store.count_in_range(user_id, from, to).await?;
        let working_days = clock::working_days_between(from, to);

        debug!(
            user_id,
            %from,
            %to,
            stored_absent = counts.absent,
            working_days,
            "Attendance summary"
        );

        Ok(AttendanceSummary {
            from,
            to,
            present: counts.present,
            on_time: counts.on_time,
            late: counts.late,
            absent: working_days.saturating_sub(counts.present),
            working_days,
            recorded_days,
        })
    }

    /// Stored records in `[from, to)`, oldest first. Days without activity are not listed.
    pub async fn list(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        self.store.list_in_range(user_id, from, to).await
    }
}
