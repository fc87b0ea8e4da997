//! Application layer: merge planning, execution and the headless analysis surface
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod executor;
pub mod plan;
pub mod prune;
pub mod report;
pub mod services;
pub mod wire;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{IoResultExt, JsonResultExt};
pub use executor::execute;
pub use plan::{plan_merge, MergeInput, MergePlan, Operation, Role};
pub use report::{MergeCounts, MergeReport, MergeWarning};
pub use wire::{AnalysisRequest, AnalysisResponse, BoneInfo, ImportedScene, SkinInfo};
