pub mod cleanup;
pub mod roster_service;

pub use cleanup::CleanupScheduler;
pub use roster_service::{RosterService, RosterView, SendReport};
