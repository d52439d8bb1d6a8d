pub mod attendance;
pub mod request;
pub mod user;

#[cfg(test)]
pub mod memory;

pub use attendance::{AttendanceStore, MySqlAttendanceStore};
pub use request::{MySqlRequestStore, RequestStore};
pub use user::UserDirectory;
