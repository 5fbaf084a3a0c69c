//! Repository modules for projects, the phase-2 aggregate, candidates,
//! the latest result set, and PRISMA counters.
//!
//! Each module adds methods to `StoreService` via `impl StoreService` blocks.
//! Functions that must run inside a caller's transaction take a
//! `&libsql::Connection` (a `Transaction` derefs to one).

pub mod candidate;
pub mod prisma;
pub mod project;
pub mod result_set;
pub mod state;
