// Public API - what other modules can use
pub use coordinator::{CycleCoordinator, CycleCoordinatorBuilder};
pub use errors::CycleError;
pub use handlers::{force_sync, trigger_cycle};
pub use models::{CycleOutcome, CycleReport, CycleState, CycleTrigger};
pub use scheduler::{start_cycle_scheduler, start_keep_alive};

// Internal modules
mod coordinator;
mod errors;
mod handlers;
pub mod models;
mod scheduler;
