pub mod auth;
pub mod dashboard;
pub mod dispatch;
pub mod shared;
pub mod system;
