//! # sift-search
//!
//! Search-strategy orchestration for sift.
//!
//! Coordinates between:
//! - Term generation (concept matrix, then per-sub-question keywords and queries)
//! - Concurrent fan-out of one sub-question to the selected bibliographic sources
//! - Post-filtering of the merged result set
//! - The per-sub-question lifecycle (searched, hidden, locked) and the
//!   "all done" predicate that gates documentation
//!
//! [`Phase2Service`] is the command surface; every mutation reads the latest
//! persisted snapshot, applies a pure transition from [`tracker`], and commits
//! through `sift-store` in one transaction.

pub mod documentation;
pub mod error;
pub mod filters;
pub mod generator;
pub mod inflight;
pub mod orchestrator;
pub mod service;
pub mod tracker;

pub use error::Phase2Error;
pub use generator::{ConfiguredGenerator, TermGenerator};
pub use orchestrator::SearchOrchestrator;
pub use service::Phase2Service;
