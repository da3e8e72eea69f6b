//! Core types used throughout the submission platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub mod identity;
pub mod leaderboard;
pub mod submission;

pub use identity::UserIdentity;
pub use leaderboard::LeaderboardEntry;
pub use submission::{Scores, Submission, SubmissionRecord, SubmissionStatus, new_submission_id};

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Reported when the crates are used as libraries without a binary calling `init_*`
static EMBEDDED: ProcessId = ProcessId::Embedded;

/// Process identifier for any component in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Submission store service
    Store,
    /// Command-line lifecycle client
    Client,
    /// Library use (tests, embedding applications)
    Embedded,
}

impl ProcessId {
    /// Initialize the global process ID for the store service
    pub fn init_store() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Store)
    }

    /// Initialize the global process ID for the client
    pub fn init_client() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Client)
    }

    /// Get the global process ID, `Embedded` when no binary initialized it
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&EMBEDDED)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Store => write!(f, "store"),
            ProcessId::Client => write!(f, "client"),
            ProcessId::Embedded => write!(f, "embedded"),
        }
    }
}
