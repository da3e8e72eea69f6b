//! Submission store for the Profile Forge competition platform
//!
//! Accepts model archives over HTTP, evaluates each one in the background and
//! serves submission status and the ranked leaderboard.

pub mod core;
pub mod error;
pub mod services;
pub mod store_impl;
pub mod traits;
pub mod types;
pub mod web;

// Re-export main types
pub use error::{StoreError, StoreResult};
pub use store_impl::StoreServer;
pub use types::*;

// Re-export trait definitions
pub use traits::{ArtifactStorage, Evaluator};

// Re-export service implementations
pub use services::{DiskArtifactStorage, SimulatedEvaluator};
