//! Lifecycle client for Profile Forge submissions
//!
//! Uploads model archives to the submission store, keeps a per-user local
//! cache of submission records in step with the store, and reads the ranked
//! leaderboard.

pub mod controller;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use controller::LifecycleController;
pub use core::{LeaderboardView, SortDirection, SortKey};
pub use error::{ClientError, ClientResult, ValidationFailure};
pub use types::*;

// Re-export trait definitions
pub use traits::{SubmissionCache, SubmissionStore};

// Re-export service implementations
pub use services::{FileSubmissionCache, HttpSubmissionStore, MemorySubmissionCache};
