//! Core business logic modules
//!
//! Pure business logic with no I/O dependencies

pub mod leaderboard;
pub mod registry;

// Re-export commonly used types
pub use leaderboard::rank_submissions;
pub use registry::SubmissionRegistry;
