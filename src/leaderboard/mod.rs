// Public API - what other modules can use
pub use assembler::{assemble, deserialize, serialize, COLUMNS};
pub use errors::LeaderboardError;
pub use handlers::{get_csv, get_leaderboard};
pub use models::{LeaderboardRecord, LeaderboardTable, ProfileRow};
pub use service::LeaderboardService;

// Internal modules
mod assembler;
mod csv;
mod errors;
mod handlers;
pub mod models;
pub mod service;
