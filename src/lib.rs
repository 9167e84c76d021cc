//! Classify ECN connectivity anomalies as path- or site-dependent.
//!
//! A run reads observations for one time window, groups admissible evidence
//! by destination, drops groups whose evidence is not diverse enough, and
//! labels the rest from their condition counts.

pub mod config;
pub mod emit;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod source;

pub type Result<T> = anyhow::Result<T>;

pub use config::Config;
pub use pipeline::{Classifier, Outcome, RunStats, classify};
