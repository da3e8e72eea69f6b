//! HTTP surface of the store

pub mod handlers;
