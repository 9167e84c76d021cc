//! Run metadata handed to the classifier, and the result info written back.
//!
//! run.json:
//! {
//!   "run_id": 4711,
//!   "output": "pathdep.jsonl",
//!   "result_info": "pathdep.info.json",
//!   "windows": [{"from": "...", "to": "..."}]
//! }

use crate::error::PipelineError;
use crate::pipeline::RunStats;
use crate::schema::{TimeSpan, Variant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct RunInfo {
    pub run_id: u64,

    /// Sink the results of this run go to.
    pub output: PathBuf,

    /// Where the run summary goes; next to the results when absent.
    #[serde(default)]
    pub result_info: Option<PathBuf>,

    #[serde(default)]
    pub windows: Vec<TimeSpan>,
}

impl RunInfo {
    /// The window processed by this run. Only the first offered window is used.
    pub fn first_window(&self) -> Result<TimeSpan, PipelineError> {
        let window = self
            .windows
            .first()
            .copied()
            .ok_or(PipelineError::NoWindow { run_id: self.run_id })?;

        if self.windows.len() > 1 {
            tracing::warn!(
                run_id = self.run_id,
                offered = self.windows.len(),
                "only the first time window is processed per run"
            );
        }
        Ok(window)
    }

    /// Result info location for results written to `output`:
    /// `pathdep.jsonl` gets `pathdep.info.json` unless the run names one.
    pub fn result_info_path(&self, output: &Path) -> PathBuf {
        self.result_info
            .clone()
            .unwrap_or_else(|| output.with_extension("info.json"))
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct ResultInfo {
    pub run_id: u64,
    pub variant: Variant,
    pub windows: Vec<TimeSpan>,
    pub stats: RunStats,
    pub batches: usize,
}
