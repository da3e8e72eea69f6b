//! Message types for the submission platform
//!
//! - `upload`: Store ↔ Client response payloads
//! - `config`: Configuration for the store service and the lifecycle client

pub mod config;
pub mod upload;

pub use config::{ClientConfig, PollPolicy, StoreConfig};

pub use upload::{ErrorDetail, UploadReceipt};
