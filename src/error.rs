//! Error types for reading evidence, classifying it, and writing results.
//!
//! Gate and filter rejections are not errors; everything here is fatal to a run.

use thiserror::Error;

/// Failures reading observations or run metadata.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error at {path}:{line}: {source}")]
    Parse {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Structural defects found while classifying.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An admitted observation lacks a field the active variant needs.
    #[error("malformed observation {id}: {reason}")]
    Malformed { id: String, reason: String },

    #[error("run {run_id} offers no time window")]
    NoWindow { run_id: u64 },
}

impl PipelineError {
    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures persisting a batch of results.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("write batch {batch}: {source}")]
    Io {
        batch: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize result for {destination}: {source}")]
    Serialize {
        destination: String,
        #[source]
        source: serde_json::Error,
    },
}
