//! `runrecon-engine` — drilling-run duplicate reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded run records, returns per-row
//! keep/flag decisions plus summary counts. No CLI dependencies.

pub mod config;
pub mod disposition;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod partition;
pub mod report;

pub use config::ReconConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{ReconInput, ReconResult, RunRecord};
