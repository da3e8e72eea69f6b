//! Service implementations
//!
//! Real implementations of all service traits for production use

pub mod artifact_storage;
pub mod evaluator;

#[cfg(test)]
pub mod tests;

// Re-export service implementations
pub use artifact_storage::DiskArtifactStorage;
pub use evaluator::SimulatedEvaluator;
