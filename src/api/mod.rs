pub mod attendance;
pub mod request;
