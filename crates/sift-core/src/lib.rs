//! # sift-core
//!
//! Core types, keys, and error types for sift.
//!
//! This crate provides the foundational types shared across all sift crates:
//! - Entity structs for the phase-2 aggregate (strategy, logs, candidates)
//! - Enums for sources, PICO components, screening, and the sub-question lifecycle
//! - `SubquestionKey` and `DedupKey` identity types
//! - Cross-cutting error types
//! - CLI response types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod keys;
pub mod responses;
