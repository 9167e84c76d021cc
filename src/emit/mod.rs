//! Result records and the batched output sink.

pub mod record;
pub mod sink;

pub use record::{ClassificationResult, ResultValue, Sources};
pub use sink::{JsonlSink, Sink, emit_batched};
