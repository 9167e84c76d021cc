//! Boundary adapters for the evidence store and the run-metadata service.

pub mod metadata;
pub mod reader;

pub use metadata::read_run_info;
pub use reader::ObservationReader;
