pub mod attendance;
pub mod request;
pub mod role;
pub mod user;
