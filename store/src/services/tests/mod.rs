//! Tests for store services

pub mod evaluator;
