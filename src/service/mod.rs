pub mod attendance;
pub mod request;

pub use attendance::AttendanceService;
pub use request::RequestService;
