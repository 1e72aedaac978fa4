pub mod performance;
pub mod session;
pub mod snapshot;
