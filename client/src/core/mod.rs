//! Core lifecycle logic with no I/O

pub mod leaderboard;
pub mod lifecycle;

pub use leaderboard::{LeaderboardView, SortDirection, SortKey};
pub use lifecycle::{Reconciliation, acknowledge, apply_observation, prepend, reconcile};
