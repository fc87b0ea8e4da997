//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod analysis;
mod merge;

pub use analysis::{AnalysisService, DuplicateNames};
pub use merge::{MergeOutcome, MergeService};
