use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PRISMA flow counters maintained by candidate saves.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PrismaCounts {
    /// Records offered for saving (after rejection).
    pub identified: u64,
    /// Records dropped because their dedup key was already present.
    pub duplicates: u64,
    /// Records rejected for lacking a usable title/abstract or identity.
    pub without_abstract: u64,
}
