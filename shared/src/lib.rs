//! Shared types for the Profile Forge submission platform
//!
//! Contains the records exchanged between the submission store and its
//! clients. Component-internal types (registry state, cache bookkeeping,
//! leaderboard views) are kept in their respective crates.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;
pub mod validation;

pub use errors::*;
pub use types::*;

// Re-export wire messages
pub use messages::{
    // Store ↔ Client payloads
    ErrorDetail, UploadReceipt,

    // Configuration types
    ClientConfig, PollPolicy, StoreConfig,
};
