//! Schema layer: JSON input/output shapes and the condition vocabulary.
//!
//! This module is intentionally separate from reading and classification.
//! It owns:
//! - Condition tags (parsed vocabulary, per-variant whitelists)
//! - Observation documents from the evidence store
//! - Run metadata (run id, windows, output location)

pub mod condition;
pub mod observation;
pub mod run;

pub use condition::{Category, Condition, Level, Variant};
pub use observation::{Document, Observation, Revision, RevisionOrder, TimeSpan};
pub use run::{ResultInfo, RunInfo};
