//! In-memory stores backing the engine tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, StatusCounts};
use crate::model::request::{NewRequest, ProcessedCounts, Request, RequestStatus};
use crate::store::{AttendanceStore, RequestStore};

#[derive(Default)]
pub struct MemoryAttendanceStore {
    records: Mutex<Vec<AttendanceRecord>>,
}

impl MemoryAttendanceStore {
    pub fn insert(&self, record: AttendanceRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn update(
        &self,
        user_id: u64,
        date: NaiveDate,
        apply: impl FnOnce(&mut AttendanceRecord),
    ) -> Result<AttendanceRecord, AppError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.user_id == user_id && r.date == date)
            .ok_or(AppError::Store(sqlx::Error::RowNotFound))?;
        apply(record);
        Ok(record.clone())
    }

    fn in_range(&self, user_id: u64, from: NaiveDate, to: NaiveDate) -> Vec<AttendanceRecord> {
        let mut found: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.date >= from && r.date < to)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.date);
        found
    }
}

impl AttendanceStore for MemoryAttendanceStore {
    async fn ensure_today(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<AttendanceRecord, AppError> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.iter().find(|r| r.user_id == user_id && r.date == date) {
            return Ok(existing.clone());
        }

        let record = AttendanceRecord {
            id: records.len() as u64 + 1,
            user_id,
            date,
            checkin_time: None,
            checkout_time: None,
            status: AttendanceStatus::Absent,
            created_at: crate::utils::clock::start_of_day(date),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn set_checkin(
        &self,
        user_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        self.update(user_id, date, |r| {
            r.checkin_time.get_or_insert(at);
        })
    }

    async fn set_status(
        &self,
        user_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, AppError> {
        self.update(user_id, date, |r| r.status = status)
    }

    async fn set_checkout(
        &self,
        user_id: u64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError> {
        self.update(user_id, date, |r| r.checkout_time = Some(at))
    }

    async fn summary_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<StatusCounts, AppError> {
        let mut counts = StatusCounts::default();
        for record in self.in_range(user_id, from, to) {
            match record.status {
                AttendanceStatus::OnTime => counts.on_time += 1,
                AttendanceStatus::Late => counts.late += 1,
                AttendanceStatus::Absent => counts.absent += 1,
            }
            counts.present = counts.on_time + counts.late;
        }
        Ok(counts)
    }

    async fn count_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u32, AppError> {
        Ok(self.in_range(user_id, from, to).len() as u32)
    }

    async fn list_in_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self.in_range(user_id, from, to))
    }
}

#[derive(Default)]
pub struct MemoryRequestStore {
    requests: Mutex<Vec<Request>>,
    names: HashMap<u64, String>,
    writes: AtomicUsize,
}

impl MemoryRequestStore {
    pub fn with_names(names: &[(u64, &str)]) -> Self {
        Self {
            names: names.iter().map(|(id, n)| (*id, n.to_string())).collect(),
            ..Default::default()
        }
    }

    /// Number of successful mutations, creation included.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: u64) -> Option<Request> {
        self.requests.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    fn with_names_resolved(&self, mut request: Request) -> Request {
        request.user_name = self.names.get(&request.user_id).cloned();
        request.approver_name = request
            .approver_id
            .and_then(|id| self.names.get(&id).cloned());
        request
    }

    fn select(&self, keep: impl Fn(&Request) -> bool) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| keep(r))
            .cloned()
            .map(|r| self.with_names_resolved(r))
            .collect()
    }
}

impl RequestStore for MemoryRequestStore {
    async fn create(&self, new: NewRequest, now: DateTime<Utc>) -> Result<Request, AppError> {
        let mut requests = self.requests.lock().unwrap();
        let request = Request {
            id: requests.len() as u64 + 1,
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
        };
        requests.push(request.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(request)
    }

    async fn find_by_user(&self, user_id: u64) -> Result<Vec<Request>, AppError> {
        let mut found = self.select(|r| r.user_id == user_id);
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn find_pending(&self) -> Result<Vec<Request>, AppError> {
        let mut found = self.select(|r| r.status == RequestStatus::Pending);
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Request>, AppError> {
        Ok(self.select(|r| r.id == id).into_iter().next())
    }

    async fn update_status_if_pending(
        &self,
        id: u64,
        status: RequestStatus,
        approver_id: u64,
        rejection_reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut requests = self.requests.lock().unwrap();
        let Some(request) = requests
            .iter_mut()
            .find(|r| r.id == id && r.status == RequestStatus::Pending)
        else {
            return Ok(false);
        };

        request.status = status;
        request.approver_id = Some(approver_id);
        request.rejection_reason = rejection_reason.map(str::to_string);
        request.updated_at = at;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn count_pending_created(
        &self,
        user_id: Option<u64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        let found = self.select(|r| {
            r.status == RequestStatus::Pending
                && r.created_at >= from
                && r.created_at < to
                && user_id.is_none_or(|u| r.user_id == u)
        });
        Ok(found.len() as u32)
    }

    async fn count_processed_updated(
        &self,
        user_id: Option<u64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ProcessedCounts, AppError> {
        let found = self.select(|r| {
            r.updated_at >= from && r.updated_at < to && user_id.is_none_or(|u| r.user_id == u)
        });
        Ok(ProcessedCounts {
            approved: found.iter().filter(|r| r.status == RequestStatus::Approved).count() as u32,
            rejected: found.iter().filter(|r| r.status == RequestStatus::Rejected).count() as u32,
        })
    }

    async fn find_processed_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Request>, AppError> {
        let mut found = self.select(|r| {
            r.status.is_terminal() && r.updated_at >= from && r.updated_at < to
        });
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }
}
