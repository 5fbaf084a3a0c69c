//! Entity structs for the sift phase-2 aggregate and its persisted collections.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so the
//! persisted phase-2 blob can be validated against its own schema.

mod log;
mod prisma;
mod protocol;
mod record;
mod result_set;
mod state;
mod strategy;

pub use log::{DEFAULT_YEAR_FROM, ResolvedQuery, ResultFilters, SubquestionLog, YearRange};
pub use prisma::PrismaCounts;
pub use protocol::{Pico, Project, Protocol};
pub use record::{Candidate, ExternalRecord};
pub use result_set::ResultSet;
pub use state::{LastSearch, Phase2State};
pub use strategy::{ConceptTerm, SourceQuery, Strategy, SubquestionBlock};
