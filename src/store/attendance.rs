use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, StatusCounts};

/// Persistence for per-user, per-day attendance records.
///
/// Implementations must guarantee at most one record per `(user_id, date)`.
#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    /// Inserts an ABSENT record for the day if none exists, then returns the stored one.
    async fn ensure_today(&self, user_id: u64, date: NaiveDate)
    -> Result<AttendanceRecord, AppError>;

    /// Sets the check-in time unless one is already stored.
    async fn set_checkin(
        &self,
        user_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError>;

    async fn set_status(
        &self,
        user_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, AppError>;

    /// Overwrites the check-out time.
    async fn set_checkout(
        &self,
        user_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError>;

    async fn summary_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<StatusCounts, AppError>;

    async fn count_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u32, AppError>;

    /// Stored records in `[from, to)`, oldest day first.
    async fn list_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError>;
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    user_id: u64,
    date: NaiveDate,
    checkin_time: Option<DateTime<Utc>>,
    checkout_time: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<AttendanceStatus>().map_err(|_| {
            AppError::Internal(format!("unknown attendance status '{}'", row.status))
        })?;

        Ok(AttendanceRecord {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            checkin_time: row.checkin_time,
            checkout_time: row.checkout_time,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct StatusCountsRow {
    present: i64,
    on_time: i64,
    late: i64,
    absent: i64,
}

const SELECT_RECORD: &str = r#"
    SELECT id, user_id, date, checkin_time, checkout_time, status, created_at
    FROM attendance
    WHERE user_id = ? AND date = ?
"#;

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_day(&self, user_id: u64, date: NaiveDate) -> Result<AttendanceRecord, AppError> {
        let row = sqlx::query_as::<_, AttendanceRow>(SELECT_RECORD)
            .bind(user_id)
            .bind(date)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }
}

impl AttendanceStore for MySqlAttendanceStore {
    async fn ensure_today(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<AttendanceRecord, AppError> {
        // UNIQUE (user_id, date) makes concurrent first inserts collapse into one row
        sqlx::query(
            r#"
            INSERT IGNORE INTO attendance (user_id, date, status)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(AttendanceStatus::Absent.as_ref())
        .execute(&self.pool)
        .await?;

        self.fetch_day(user_id, date).await
    }

    async fn set_checkin(
        &self,
        user_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        sqlx::query(
            r#"
            UPDATE attendance
            SET checkin_time = COALESCE(checkin_time, ?)
            WHERE user_id = ? AND date = ?
            "#,
        )
        .bind(at)
        .bind(user_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        self.fetch_day(user_id, date).await
    }

    async fn set_status(
        &self,
        user_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, AppError> {
        sqlx::query("UPDATE attendance SET status = ? WHERE user_id = ? AND date = ?")
            .bind(status.as_ref())
            .bind(user_id)
            .bind(date)
            .execute(&self.pool)
            .await?;

        self.fetch_day(user_id, date).await
    }

    async fn set_checkout(
        &self,
        user_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        sqlx::query("UPDATE attendance SET checkout_time = ? WHERE user_id = ? AND date = ?")
            .bind(at)
            .bind(user_id)
            .bind(date)
            .execute(&self.pool)
            .await?;

        self.fetch_day(user_id, date).await
    }

    async fn summary_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<StatusCounts, AppError> {
        let row = sqlx::query_as::<_, StatusCountsRow>(
            r#"
            SELECT
                CAST(COALESCE(SUM(status IN ('ON_TIME', 'LATE')), 0) AS SIGNED) AS present,
                CAST(COALESCE(SUM(status = 'ON_TIME'), 0) AS SIGNED) AS on_time,
                CAST(COALESCE(SUM(status = 'LATE'), 0) AS SIGNED) AS late,
                CAST(COALESCE(SUM(status = 'ABSENT'), 0) AS SIGNED) AS absent
            FROM attendance
            WHERE user_id = ? AND date >= ? AND date < ?
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(StatusCounts {
            present: row.present as u32,
            on_time: row.on_time as u32,
            late: row.late as u32,
            absent: row.absent as u32,
        })
    }

    async fn count_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u32, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance WHERE user_id = ? AND date >= ? AND date < ?",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u32)
    }

    async fn list_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, user_id, date, checkin_time, checkout_time, status, created_at
            FROM attendance
            WHERE user_id = ? AND date >= ? AND date < ?
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }
}
