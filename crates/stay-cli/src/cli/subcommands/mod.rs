pub mod auth;
pub mod system;

pub use auth::{AuthCommands, AuthLoginArgs};
pub use system::{SystemCommands, SystemInitArgs};
