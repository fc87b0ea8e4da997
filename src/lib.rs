//! rigmerge: merge a clothing skeleton into an avatar skeleton by bone name.
//!
//! The merge is planned once on a snapshot ([`application::plan_merge`]) and
//! then either applied to a live scene ([`application::execute`]) or serialized
//! as a headless analysis response ([`application::AnalysisResponse`]).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
