mod report;
mod session;

pub use report::settle;
pub use session::SessionSummary;
