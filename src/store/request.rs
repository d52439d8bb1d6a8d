use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::AppError;
use crate::model::request::{NewRequest, ProcessedCounts, Request, RequestStatus, RequestType};

/// Persistence for leave and overtime requests.
#[allow(async_fn_in_trait)]
pub trait RequestStore {
    /// Stores a new PENDING request with both timestamps set to `now`.
    async fn create(&self, new: NewRequest, now: DateTime<Utc>) -> Result<Request, AppError>;

    /// A user's requests, newest first.
    async fn find_by_user(&self, user_id: u64) -> Result<Vec<Request>, AppError>;

    /// Every pending request, oldest first.
    async fn find_pending(&self) -> Result<Vec<Request>, AppError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<Request>, AppError>;

    /// Moves a request out of PENDING in one conditional write.
    ///
    /// Returns `false` when no row was changed, either because the id is unknown or because
    /// the request is no longer pending.
    async fn update_status_if_pending(
        &self,
        id: u64,
        status: RequestStatus,
        approver_id: u64,
        rejection_reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Pending requests whose `created_at` falls in `[from, to)`.
    async fn count_pending_created(
        &self,
        user_id: Option<u64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u32, AppError>;

    /// Approved and rejected requests whose `updated_at` falls in `[from, to)`.
    async fn count_processed_updated(
        &self,
        user_id: Option<u64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ProcessedCounts, AppError>;

    /// Processed requests decided in `[from, to)`, newest decision first, with requester and
    /// approver names resolved.
    async fn find_processed_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Request>, AppError>;
}

#[derive(FromRow)]
struct RequestRow {
    id: u64,
    user_id: u64,
    #[sqlx(rename = "type")]
    request_type: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    reason: String,
    status: String,
    approver_id: Option<u64>,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_name: Option<String>,
    approver_name: Option<String>,
}

impl TryFrom<RequestRow> for Request {
    type Error = AppError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let request_type = row.request_type.parse::<RequestType>().map_err(|_| {
            AppError::Internal(format!("unknown request type '{}'", row.request_type))
        })?;
        let status = row.status.parse::<RequestStatus>().map_err(|_| {
            AppError::Internal(format!("unknown request status '{}'", row.status))
        })?;

        Ok(Request {
            id: row.id,
            user_id: row.user_id,
            request_type,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status,
            approver_id: row.approver_id,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user_name: row.user_name,
            approver_name: row.approver_name,
        })
    }
}

#[derive(FromRow)]
struct ProcessedCountsRow {
    approved: i64,
    rejected: i64,
}

// Columns shared by every request listing; names come from the user directory table.
const SELECT_REQUEST: &str = r#"
    SELECT
        r.id, r.user_id, r.`type`, r.start_date, r.end_date, r.reason, r.status,
        r.approver_id, r.rejection_reason, r.created_at, r.updated_at,
        u.name AS user_name,
        a.name AS approver_name
    FROM requests r
    LEFT JOIN users u ON u.id = r.user_id
    LEFT JOIN users a ON a.id = r.approver_id
"#;

#[derive(Clone)]
pub struct MySqlRequestStore {
    pool: MySqlPool,
}

impl MySqlRequestStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, sql: &str) -> Result<Vec<Request>, AppError> {
        let rows = sqlx::query_as::<_, RequestRow>(sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Request::try_from).collect()
    }
}

impl RequestStore for MySqlRequestStore {
    async fn create(&self, new: NewRequest, now: DateTime<Utc>) -> Result<Request, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO requests
                (user_id, `type`, start_date, end_date, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.request_type.as_ref())
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.reason)
        .bind(RequestStatus::Pending.as_ref())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Request {
            id: result.last_insert_id(),
            user_id: new.user_id,
            request_type: new.request_type,
            start_date: new.start_date,
            end_date: new.end_date,
            reason: new.reason,
            status: RequestStatus::Pending,
            approver_id: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            user_name: None,
            approver_name: None,
        })
    }

    async fn find_by_user(&self, user_id: u64) -> Result<Vec<Request>, AppError> {
        let sql = format!("{SELECT_REQUEST} WHERE r.user_id = ? ORDER BY r.created_at DESC, r.id DESC");
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Request::try_from).collect()
    }

    async fn find_pending(&self) -> Result<Vec<Request>, AppError> {
        let sql = format!(
            "{SELECT_REQUEST} WHERE r.status = '{}' ORDER BY r.created_at ASC, r.id ASC",
            RequestStatus::Pending
        );
        self.fetch_all(&sql).await
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Request>, AppError> {
        let sql = format!("{SELECT_REQUEST} WHERE r.id = ?");
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Request::try_from).transpose()
    }

    async fn update_status_if_pending(
        &self,
        id: u64,
        status: RequestStatus,
        approver_id: u64,
        rejection_reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE requests
            SET status = ?, approver_id = ?, rejection_reason = ?, updated_at = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(status.as_ref())
        .bind(approver_id)
        .bind(rejection_reason)
        .bind(at)
        .bind(id)
        .bind(RequestStatus::Pending.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_pending_created(
        &self,
        user_id: Option<u64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        let mut sql = String::from(
            "SELECT COUNT(*) FROM requests WHERE status = ? AND created_at >= ? AND created_at < ?",
        );
        if user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }

        let mut query = sqlx::query_scalar::<_, i64>(&sql)
            .bind(RequestStatus::Pending.as_ref())
            .bind(from)
            .bind(to);
        if let Some(user_id) = user_id {
            query = query.bind(user_id);
        }

        let count = query.fetch_one(&self.pool).await?;
        Ok(count as u32)
    }

    async fn count_processed_updated(
        &self,
        user_id: Option<u64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ProcessedCounts, AppError> {
        let mut sql = String::from(
            r#"
            SELECT
                CAST(COALESCE(SUM(status = 'APPROVED'), 0) AS SIGNED) AS approved,
                CAST(COALESCE(SUM(status = 'REJECTED'), 0) AS SIGNED) AS rejected
            FROM requests
            WHERE updated_at >= ? AND updated_at < ?
            "#,
        );
        if user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }

        let mut query = sqlx::query_as::<_, ProcessedCountsRow>(&sql)
            .bind(from)
            .bind(to);
        if let Some(user_id) = user_id {
            query = query.bind(user_id);
        }

        let row = query.fetch_one(&self.pool).await?;
        Ok(ProcessedCounts {
            approved: row.approved as u32,
            rejected: row.rejected as u32,
        })
    }

    async fn find_processed_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Request>, AppError> {
        let sql = format!(
            r#"{SELECT_REQUEST}
            WHERE r.status IN ('{}', '{}')
            AND r.updated_at >= ? AND r.updated_at < ?
            ORDER BY r.updated_at DESC, r.id DESC"#,
            RequestStatus::Approved,
            RequestStatus::Rejected
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Request::try_from).collect()
    }
}
