//! Integration test utilities for the social backend
//!
//! This crate provides helpers for running end-to-end scenarios against the
//! service layer, wired either to the in-memory backend or to PostgreSQL and
//! Redis when they are available.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
