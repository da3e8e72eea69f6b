//! Tests for client services

pub mod memory_cache;
